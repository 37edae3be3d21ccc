mod common;

use common::item;
use outfit_core::catalog::metadata::keys;
use outfit_core::catalog::CatalogItem;
use outfit_core::pipeline::FallbackPolicy;
use outfit_core::types::{
    CompositionMetadata, CompositionResult, Descriptor, DescriptorKind, FallbackUse, ItemId,
    Quality, Shape,
};
use serde_json::{json, Value};

fn jacket() -> CatalogItem {
    let mut jacket = item(1, "Blue Denim Jacket", "Blue", "Topwear", "Jackets", "Classic denim");
    jacket.metadata.insert_string(keys::PLACEMENT, "scored");
    jacket.metadata.insert_string(keys::THEME, "Weekend Denim");
    jacket
}

#[test]
fn golden_composition_result_serialization() {
    let result = CompositionResult {
        items: vec![jacket()],
        composition: CompositionMetadata {
            shape: Shape::VibeOutfit,
            descriptor: DescriptorKind::SelectedIds,
            items_considered: 12,
            items_scored: 3,
            fallback: FallbackUse::NotUsed,
            theme: Some("Weekend Denim".to_string()),
        },
    };

    let value: Value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value,
        json!({
            "items": [{
                "id": 1,
                "name": "Blue Denim Jacket",
                "description": "Classic denim",
                "color": "Blue",
                "category": "Jackets",
                "master_category": "Topwear",
                "metadata": {"placement": "scored", "theme": "Weekend Denim"}
            }],
            "composition": {
                "shape": "vibe_outfit",
                "descriptor": "selected_ids",
                "items_considered": 12,
                "items_scored": 3,
                "fallback": "not_used",
                "theme": "Weekend Denim"
            }
        })
    );

    let back: CompositionResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn item_fields_serialize_in_declaration_order() {
    let json = serde_json::to_string(&jacket().with_brand("Levi's")).unwrap();
    assert_eq!(
        json,
        r#"{"id":1,"name":"Blue Denim Jacket","description":"Classic denim","color":"Blue","category":"Jackets","master_category":"Topwear","brand":"Levi's","metadata":{"placement":"scored","theme":"Weekend Denim"}}"#
    );
}

#[test]
fn absent_theme_and_empty_metadata_are_omitted() {
    let metadata = CompositionMetadata {
        shape: Shape::Personalized,
        descriptor: DescriptorKind::Qualities,
        items_considered: 0,
        items_scored: 0,
        fallback: FallbackUse::Replaced,
        theme: None,
    };
    let value = serde_json::to_value(&metadata).unwrap();
    assert!(value.get("theme").is_none());
    assert_eq!(value["fallback"], "replaced");

    let bare = serde_json::to_value(CatalogItem::new(5, "Tote")).unwrap();
    assert!(bare.get("metadata").is_none());
    assert!(bare.get("gender").is_none());
}

#[test]
fn sparse_catalog_rows_deserialize_with_defaults() {
    let row: CatalogItem = serde_json::from_str(r#"{"id": 42, "name": "Linen Shirt"}"#).unwrap();
    assert_eq!(row.id, ItemId::new(42));
    assert!(row.description.is_empty());
    assert!(row.master_category.is_empty());
    assert!(row.metadata.is_empty());
}

#[test]
fn golden_descriptor_serialization() {
    let selection = Descriptor::SelectedIds {
        ids: vec![ItemId::new(3), ItemId::new(1)],
        theme: "Weekend Denim".into(),
        reasoning: "Easy layers.".into(),
    };
    assert_eq!(
        serde_json::to_value(&selection).unwrap(),
        json!({"kind": "selected_ids", "ids": [3, 1], "theme": "Weekend Denim", "reasoning": "Easy layers."})
    );

    let qualities = Descriptor::Qualities {
        qualities: vec![Quality::new("linen"), Quality::weighted("black", 2.0)],
        summary: "Minimal".into(),
    };
    assert_eq!(
        serde_json::to_value(&qualities).unwrap(),
        json!({
            "kind": "qualities",
            "qualities": [{"term": "linen", "weight": 1.0}, {"term": "black", "weight": 2.0}],
            "summary": "Minimal"
        })
    );

    let unweighted: Quality = serde_json::from_str(r#"{"term": "suede"}"#).unwrap();
    assert_eq!(unweighted, Quality::new("suede"));
}

#[test]
fn golden_fallback_policy_serialization() {
    assert_eq!(
        serde_json::to_value(FallbackPolicy::TopUp { min: 3, target: 8 }).unwrap(),
        json!({"policy": "top_up", "min": 3, "target": 8})
    );
    assert_eq!(
        serde_json::to_value(FallbackPolicy::Never).unwrap(),
        json!({"policy": "never"})
    );
}
