use super::*;
use serde_json::json;

#[test]
fn test_portrait_room_name() {
    assert_eq!(portrait_room(5), "portrait5");
    assert_eq!(portrait_room(120), "portrait120");
}

#[test]
fn test_attribute_change_null_fields_deserialize_as_none() {
    let event: LiveEvent = serde_json::from_value(json!({
        "event": "attributeChange",
        "playerId": 5,
        "attributeId": 2,
        "value": 10,
        "maxValue": null
    }))
    .unwrap();

    assert_eq!(
        event,
        LiveEvent::AttributeChange {
            player_id: 5,
            attribute_id: 2,
            value: Some(10),
            max_value: None,
        }
    );
}

#[test]
fn test_dice_result_without_description() {
    let event: LiveEvent = serde_json::from_value(json!({
        "event": "diceResult",
        "playerId": 3,
        "dices": [{ "num": 1, "roll": 20 }],
        "results": [{ "roll": 18 }]
    }))
    .unwrap();

    match event {
        LiveEvent::DiceResult {
            player_id,
            dices,
            results,
        } => {
            assert_eq!(player_id, 3);
            assert_eq!(dices[0].roll, 20);
            assert!(dices[0].reference.is_none());
            assert_eq!(results[0].roll, 18);
            assert!(results[0].description.is_none());
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_dice_roll_has_no_payload() {
    let event: LiveEvent = serde_json::from_value(json!({ "event": "diceRoll" })).unwrap();
    assert_eq!(event, LiveEvent::DiceRoll);
    assert_eq!(serde_json::to_value(&event).unwrap(), json!({ "event": "diceRoll" }));
}

#[test]
fn test_config_change_serializes_with_event_tag() {
    let event = LiveEvent::ConfigChange {
        key: "environment".to_string(),
        value: json!("combat"),
    };

    assert_eq!(event.name(), "configChange");
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({ "event": "configChange", "key": "environment", "value": "combat" })
    );
}

#[test]
fn test_unknown_event_rejected() {
    let result: Result<LiveEvent, _> =
        serde_json::from_value(json!({ "event": "sheetReload", "playerId": 1 }));
    assert!(result.is_err());
}
