mod fixtures;

use fixtures::{assert_near, load_ref_values, load_reference_ohlcvs};
use quantedge_overlay::{IndicatorRequest, OhlcvBar, calculate_indicators};
use serde_json::{Value, json};

fn requests_from_json(value: Value) -> Vec<IndicatorRequest> {
    serde_json::from_value(value).expect("valid request list")
}

#[test]
fn chart_request_list_produces_expected_shapes() {
    let bars = load_reference_ohlcvs();
    let requests = requests_from_json(json!([
        { "id": "sma-20", "type": "SMA", "params": { "period": 20 } },
        { "id": "rsi", "type": "RSI" },
        { "id": "macd", "type": "MACD", "visible": true },
        { "id": "bands", "type": "BOLLINGER", "params": { "period": 20, "stdDev": 2 } },
        { "id": "ema-hidden", "type": "EMA", "visible": false }
    ]));

    let results = calculate_indicators(&bars, &requests);
    let json = serde_json::to_value(&results).expect("serialisable results");

    let sma = json["sma-20"].as_array().expect("flat line");
    assert_eq!(sma.len(), bars.len() - 19);
    assert!(sma[0]["time"].is_u64());
    assert!(sma[0]["value"].is_f64());

    assert_eq!(json["rsi"].as_array().map(Vec::len), Some(bars.len() - 14));

    for key in ["macd", "signal", "histogram"] {
        let line = json["macd"][key].as_array().expect("MACD line");
        assert_eq!(line.len(), bars.len() - 33, "MACD {key} length");
    }

    for key in ["upper", "middle", "lower"] {
        let line = json["bands"][key].as_array().expect("band line");
        assert_eq!(line.len(), bars.len() - 19, "band {key} length");
    }

    assert!(json.get("ema-hidden").is_none());
}

#[test]
fn aggregated_sma_matches_reference() {
    let bars = load_reference_ohlcvs();
    let reference = load_ref_values("tests/fixtures/data/sma-20-close.csv");
    let requests = requests_from_json(json!([{ "id": "s", "type": "SMA" }]));

    let results = calculate_indicators(&bars, &requests);
    let line = results["s"].as_line().expect("line series");

    assert_eq!(line.len(), reference.len());
    for (point, expected) in line.iter().zip(&reference) {
        assert_eq!(point.time, expected.time);
        assert_near(point.value, expected.expected, 1e-6, "aggregated SMA(20)");
    }
}

#[test]
fn invalid_params_are_skipped() {
    let bars = load_reference_ohlcvs();
    let requests = requests_from_json(json!([
        { "id": "fractional", "type": "SMA", "params": { "period": 2.5 } },
        { "id": "negative-band", "type": "BOLLINGER", "params": { "stdDev": -1 } },
        { "id": "ok", "type": "EMA", "params": { "period": 0 } }
    ]));

    let results = calculate_indicators(&bars, &requests);

    assert_eq!(results.keys().collect::<Vec<_>>(), ["ok"]);
    assert_eq!(results["ok"].len(), bars.len() - 11);
}

#[test]
fn works_with_plain_ohlcv_bars() {
    let bars: Vec<OhlcvBar> = serde_json::from_value(json!([
        { "time": 1, "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0 },
        { "time": 2, "open": 3.0, "high": 3.0, "low": 3.0, "close": 3.0 },
        { "time": 3, "open": 4.0, "high": 4.0, "low": 4.0, "close": 4.0 },
        { "time": 4, "open": 10.0, "high": 10.0, "low": 10.0, "close": 10.0 }
    ]))
    .expect("valid bars");
    let requests = requests_from_json(json!([
        { "id": "m", "type": "MACD",
          "params": { "fastPeriod": 1, "slowPeriod": 2, "signalPeriod": 2 } }
    ]));

    let results = calculate_indicators(&bars, &requests);
    let json = serde_json::to_value(&results).expect("serialisable results");

    // slow EMA: 2, 10/3, 70/9; MACD line from bar 2: 1, 2/3, 20/9
    // signal seeds on bar 3 at (1 + 2/3) / 2
    let expected = [(3, 2.0 / 3.0, 5.0 / 6.0), (4, 20.0 / 9.0, 95.0 / 54.0)];
    for (i, (time, macd, signal)) in expected.into_iter().enumerate() {
        for (key, value) in [("macd", macd), ("signal", signal), ("histogram", macd - signal)] {
            let point = &json["m"][key][i];
            assert_eq!(point["time"], time, "{key} time at {i}");
            assert_near(
                point["value"].as_f64().expect("numeric value"),
                value,
                1e-12,
                &format!("{key} at {i}"),
            );
        }
    }
    assert_eq!(json["m"]["macd"].as_array().map(Vec::len), Some(2));
}

#[test]
fn empty_bars_yield_empty_series() {
    let bars: Vec<OhlcvBar> = Vec::new();
    let requests = requests_from_json(json!([
        { "id": "s", "type": "SMA" },
        { "id": "b", "type": "BOLLINGER" }
    ]));

    let json = serde_json::to_value(calculate_indicators(&bars, &requests)).unwrap();

    assert_eq!(json, json!({ "s": [], "b": { "upper": [], "middle": [], "lower": [] } }));
}
