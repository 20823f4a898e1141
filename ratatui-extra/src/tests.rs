mod candle_chart;
