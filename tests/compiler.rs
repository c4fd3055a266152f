//! Tests for compiling chains into the wire format.
mod common;
use common::*;
use serde_json::{Value, json};
use stepchain::prelude::*;

#[test]
fn test_compile_is_repeatable() {
    let chain = create_summary_chain();
    let first = chain.compile().expect("Failed to compile");
    let second = chain.compile().expect("Failed to compile");

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    // Compiling does not consume or alter the builder state.
    assert_eq!(chain.steps().len(), 4);
}

#[test]
fn test_wire_keys_are_in_order() {
    let compiled = create_pdf_qa_chain().compile().unwrap();
    let value = compiled.to_value().unwrap();

    let top_keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        top_keys,
        [
            "studio_id",
            "title",
            "description",
            "params_schema",
            "transformations",
            "publicly_triggerable",
            "public",
        ]
    );

    let step_keys: Vec<&str> = value["transformations"]["steps"][1]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(step_keys, ["name", "transformation", "params"]);

    let param_keys: Vec<&str> = value["transformations"]["steps"][1]["params"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(param_keys, ["method", "num_tokens", "text"]);
}

#[test]
fn test_default_chain_metadata() {
    let compiled = create_single_step_chain().compile().unwrap();
    assert_eq!(compiled.studio_id, "LOCAL_DEV_CHAIN");
    assert_eq!(compiled.title, "");
    assert!(!compiled.publicly_triggerable);
    assert!(!compiled.public);
    assert!(compiled.params_schema.properties.is_empty());
}

#[test]
fn test_chain_id_overrides_studio_id() {
    let mut chain = create_single_step_chain();
    chain.set_chain_id("my-chain");
    assert_eq!(chain.compile().unwrap().studio_id, "my-chain");
}

#[test]
fn test_default_output_is_last_step_result() {
    let compiled = create_single_step_chain().compile().unwrap();
    assert_eq!(
        compiled.output(),
        &json!("{{steps.prompt_completion.output}}")
    );

    let mut chain = Chain::new();
    chain
        .with_iteration(vec!["a", "b"], |chain, scope| {
            chain.add_step("prompt_completion", params! { "prompt" => scope.item })
        })
        .unwrap();
    assert_eq!(
        chain.compile().unwrap().output(),
        &json!("{{steps.prompt_completion.results}}")
    );
}

#[test]
fn test_empty_chain_has_null_output() {
    let compiled = Chain::new().compile().unwrap();
    assert!(compiled.steps().is_empty());
    assert_eq!(compiled.output(), &Value::Null);
}

#[test]
fn test_conditions_are_emitted_as_if() {
    let mut chain = Chain::new();
    chain
        .with_condition(Reference::params().field("enabled"), |chain| {
            chain.add_step("api_call", ParamMap::new())
        })
        .unwrap();
    chain
        .with_condition(None::<bool>, |chain| chain.add_step("api_call", ParamMap::new()))
        .unwrap();
    chain
        .with_condition(false, |chain| chain.add_step("api_call", ParamMap::new()))
        .unwrap();
    chain.add_step("api_call", ParamMap::new()).unwrap();

    let value = chain.compile().unwrap().to_value().unwrap();
    let steps = &value["transformations"]["steps"];
    assert_eq!(steps[0]["if"], json!("{{params.enabled}}"));
    // A null condition is still written out.
    assert_eq!(steps[1].as_object().unwrap().get("if"), Some(&Value::Null));
    assert_eq!(steps[2]["if"], json!(false));
    assert!(steps[3].as_object().unwrap().get("if").is_none());
}

#[test]
fn test_literal_iteration_source() {
    let mut chain = Chain::new();
    chain
        .with_iteration(vec![Param::from("a"), Param::from(2), Param::Null], |chain, scope| {
            chain.add_step("api_call", params! { "item" => scope.item, "at" => scope.index })
        })
        .unwrap();

    let compiled = chain.compile().unwrap();
    let step = compiled.step("api_call").unwrap();
    assert_eq!(step.foreach, Some(json!(["a", 2, null])));
    assert_eq!(step.params["item"], json!("{{foreach.item}}"));
    assert_eq!(step.params["at"], json!("{{foreach.index}}"));
}

#[test]
fn test_references_are_replaced_at_any_depth() {
    let mut chain = Chain::new();
    let params = chain.define_params(ParamsSchema::new()).unwrap();
    chain
        .add_step(
            "api_call",
            params! {
                "body" => params! {
                    "items" => vec![Param::from(params.field("a")), Param::from(1.5)],
                    "nested" => params! { "deep" => params.field("b").each() },
                },
                "flag" => true,
                "missing" => Param::Null,
            },
        )
        .unwrap();

    let compiled = chain.compile().unwrap();
    assert_eq!(
        Value::Object(compiled.steps()[0].params.clone()),
        json!({
            "body": {
                "items": ["{{params.a}}", 1.5],
                "nested": { "deep": "{{params.b[*]}}" }
            },
            "flag": true,
            "missing": null
        })
    );
}

#[test]
fn test_non_finite_number_reports_its_location() {
    let mut chain = Chain::new();
    chain.add_step("api_call", ParamMap::new()).unwrap();
    chain
        .add_step(
            "prompt_completion",
            params! { "prompt" => "hi", "temperature" => f64::NAN },
        )
        .unwrap();

    match chain.compile() {
        Err(SerializationError::NonFiniteNumber { path, value }) => {
            assert_eq!(path, "transformations.steps[1].params.temperature");
            assert!(value.is_nan());
        }
        other => panic!("Expected NonFiniteNumber error, got {:?}", other),
    }
}

#[test]
fn test_non_finite_number_in_output() {
    let mut chain = Chain::new();
    chain
        .define_output(Output::mapping([("score", f64::INFINITY)]))
        .unwrap();
    let err = chain.compile().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Value at 'transformations.output.score' is not serializable: inf is not a finite number"
    );
}

#[test]
fn test_json_round_trip_of_compiled_chain() {
    let compiled = create_summary_chain().compile().unwrap();
    let parsed = CompiledChain::from_json(&compiled.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed, compiled);
}

#[test]
fn test_step_dependencies() {
    let compiled = create_pdf_qa_chain().compile().unwrap();
    assert!(compiled.step("pdf_to_text").unwrap().dependencies().is_empty());
    assert_eq!(
        compiled.step("search_array").unwrap().dependencies(),
        ["split_text"]
    );
    assert_eq!(
        compiled.step("prompt_completion").unwrap().template_paths(),
        ["steps.search_array.output.results", "params.question"]
    );
}

#[test]
fn test_display_chain_tree() {
    let compiled = create_pdf_qa_chain().compile().unwrap();
    let rendered = DisplayChain::new(&compiled).to_string();

    assert!(rendered.starts_with("LOCAL_DEV_CHAIN (Ask questions about a short PDF)\n"));
    assert!(rendered.contains("├── pdf_to_text [pdf_to_text]\n│   └── pdf_url: {{params.pdf_url}}\n"));
    assert!(rendered.contains("└── prompt_completion [prompt_completion]\n"));
    assert!(rendered.ends_with("output: { answer: {{steps.prompt_completion.output.answer}} }"));
}
