//! Tests for chain definition: naming, contexts and lifecycle rules.
mod common;
use common::*;
use stepchain::chain::CODE_TRANSFORMATION;
use stepchain::prelude::*;

#[test]
fn test_repeated_transformations_get_numbered_names() {
    let mut chain = Chain::new();
    for _ in 0..4 {
        chain
            .add_step("prompt_completion", params! { "prompt" => "hi" })
            .unwrap();
    }
    chain.add_step("pdf_to_text", ParamMap::new()).unwrap();

    let names: Vec<&str> = chain.steps().iter().map(Step::name).collect();
    assert_eq!(
        names,
        [
            "prompt_completion",
            "prompt_completion_2",
            "prompt_completion_3",
            "prompt_completion_4",
            "pdf_to_text",
        ]
    );
}

#[test]
fn test_add_step_returns_the_output_reference() {
    let mut chain = Chain::new();
    let first = chain.add_step("split_text", ParamMap::new()).unwrap();
    let second = chain.add_step("split_text", ParamMap::new()).unwrap();
    assert_eq!(first.path(), "steps.split_text.output");
    assert_eq!(second.path(), "steps.split_text_2.output");
}

#[test]
fn test_named_steps_and_duplicates() {
    let mut chain = Chain::new();
    let summary = chain
        .add_named_step("summary", "prompt_completion", ParamMap::new())
        .unwrap();
    assert_eq!(summary.path(), "steps.summary.output");

    let duplicate = chain.add_named_step("summary", "join_array", ParamMap::new());
    assert_eq!(
        duplicate,
        Err(DefinitionError::DuplicateStepName {
            name: "summary".to_string()
        })
    );
    assert_eq!(chain.steps().len(), 1);
}

#[test]
fn test_auto_names_skip_explicitly_taken_names() {
    let mut chain = Chain::new();
    chain
        .add_named_step("api_call", "prompt_completion", ParamMap::new())
        .unwrap();
    chain.add_step("api_call", ParamMap::new()).unwrap();
    chain.add_step("api_call", ParamMap::new()).unwrap();

    let names: Vec<&str> = chain.steps().iter().map(Step::name).collect();
    assert_eq!(names, ["api_call", "api_call_1", "api_call_2"]);
}

#[test]
fn test_params_and_output_are_defined_once() {
    let mut chain = Chain::new();
    let params = chain.define_params(ParamsSchema::new()).unwrap();
    assert_eq!(params, Reference::params());
    assert_eq!(
        chain.define_params(ParamsSchema::new()),
        Err(DefinitionError::ParamsAlreadyDefined)
    );

    chain.define_output(Output::Null).unwrap();
    assert_eq!(
        chain.define_output(Output::Null),
        Err(DefinitionError::OutputAlreadyDefined)
    );
}

#[test]
fn test_builder_params_count_as_defined() {
    let (mut chain, params) = Chain::builder()
        .param("question", ParamSchema::string())
        .build();
    assert_eq!(params.field("question").path(), "params.question");
    assert_eq!(
        chain.define_params(ParamsSchema::new()),
        Err(DefinitionError::ParamsAlreadyDefined)
    );
}

#[test]
fn test_condition_is_attached_to_every_step_in_the_body() {
    let mut chain = Chain::new();
    let params = chain.define_params(ParamsSchema::new()).unwrap();
    let enabled = params.field("enabled");

    chain
        .with_condition(&enabled, |chain| {
            chain.add_step("api_call", ParamMap::new())?;
            chain.add_step("prompt_completion", ParamMap::new())
        })
        .unwrap();
    chain.add_step("join_array", ParamMap::new()).unwrap();

    let steps = chain.steps();
    assert_eq!(steps[0].condition(), Some(&Condition::Ref(enabled.clone())));
    assert_eq!(steps[1].condition(), Some(&Condition::Ref(enabled)));
    assert_eq!(steps[2].condition(), None);
}

#[test]
fn test_nested_conditions_are_rejected() {
    let mut chain = Chain::new();
    let result = chain.with_condition(true, |chain| {
        chain.with_condition(false, |chain| chain.add_step("api_call", ParamMap::new()))
    });
    assert_eq!(result, Err(DefinitionError::ConditionAlreadyActive));

    // The slot is free again after the failed body.
    chain
        .with_condition(true, |chain| chain.add_step("api_call", ParamMap::new()))
        .unwrap();
    assert_eq!(chain.steps().len(), 1);
}

#[test]
fn test_iteration_returns_the_results_reference() {
    let mut chain = Chain::new();
    let chunks = chain.add_step("split_text", ParamMap::new()).unwrap().field("chunks");

    let results = chain
        .with_iteration(&chunks, |chain, scope| {
            assert_eq!(scope.item.path(), "foreach.item");
            assert_eq!(scope.index.path(), "foreach.index");
            chain.add_step("prompt_completion", params! { "prompt" => scope.item })
        })
        .unwrap();

    assert_eq!(results.path(), "steps.prompt_completion.results");
    let step = chain.step("prompt_completion").unwrap();
    assert!(step.is_iterated());
    assert_eq!(step.iteration_source(), Some(&IterationSource::Ref(chunks)));
}

#[test]
fn test_add_step_inside_iteration_returns_results() {
    let mut chain = Chain::new();
    let mut inner = None;
    chain
        .with_iteration(vec!["a", "b"], |chain, _scope| {
            inner = Some(chain.add_step("prompt_completion", ParamMap::new())?);
            Ok(())
        })
        .unwrap();
    assert_eq!(inner.unwrap().path(), "steps.prompt_completion.results");
}

#[test]
fn test_iteration_body_must_add_exactly_one_step() {
    let mut chain = Chain::new();
    let empty = chain.with_iteration(vec![1, 2, 3], |_chain, _scope| Ok(()));
    assert_eq!(empty, Err(DefinitionError::IterationStepCount { added: 0 }));

    let two = chain.with_iteration(vec![1, 2, 3], |chain, _scope| {
        chain.add_step("api_call", ParamMap::new())?;
        chain.add_step("api_call", ParamMap::new())
    });
    assert_eq!(two, Err(DefinitionError::IterationStepCount { added: 2 }));
}

#[test]
fn test_nested_iterations_are_rejected_and_cleared() {
    let mut chain = Chain::new();
    let result = chain.with_iteration(vec![1], |chain, _scope| {
        chain.with_iteration(vec![2], |chain, _scope| {
            chain.add_step("api_call", ParamMap::new())
        })
    });
    assert_eq!(result, Err(DefinitionError::IterationAlreadyActive));

    // Steps added after the failure carry no iteration.
    chain.add_step("join_array", ParamMap::new()).unwrap();
    assert!(!chain.step("join_array").unwrap().is_iterated());
}

#[test]
fn test_failed_iteration_leaves_no_partial_graph() {
    let mut chain = Chain::new();
    chain.add_step("split_text", ParamMap::new()).unwrap();

    let two = chain.with_iteration(vec![1, 2], |chain, _scope| {
        chain.add_step("api_call", ParamMap::new())?;
        chain.add_step("api_call", ParamMap::new())
    });
    assert_eq!(two, Err(DefinitionError::IterationStepCount { added: 2 }));
    assert_eq!(chain.steps().len(), 1);

    let nested = chain.with_iteration(vec![1], |chain, _scope| {
        chain.with_iteration(vec![2], |chain, _scope| {
            chain.add_step("api_call", ParamMap::new())
        })
    });
    assert_eq!(nested, Err(DefinitionError::IterationAlreadyActive));
    assert_eq!(chain.steps().len(), 1);

    // Name allocation is restored too.
    let next = chain.add_step("api_call", ParamMap::new()).unwrap();
    assert_eq!(next.path(), "steps.api_call.output");

    let compiled = chain.compile().unwrap();
    assert_eq!(compiled.steps().len(), 2);
    assert!(compiled.steps().iter().all(|step| step.foreach.is_none()));
    assert_eq!(compiled.output(), &serde_json::json!("{{steps.api_call.output}}"));
}

#[test]
fn test_failed_condition_body_is_discarded() {
    let mut chain = Chain::new();
    chain
        .add_named_step("taken", "join_array", ParamMap::new())
        .unwrap();

    let result = chain.with_condition(true, |chain| {
        chain.add_step("prompt_completion", ParamMap::new())?;
        chain.define_output(Output::Null)?;
        chain.add_named_step("taken", "api_call", ParamMap::new())
    });
    assert_eq!(
        result,
        Err(DefinitionError::DuplicateStepName {
            name: "taken".to_string()
        })
    );
    assert_eq!(chain.steps().len(), 1);
    assert!(chain.output().is_none());

    let next = chain.add_step("prompt_completion", ParamMap::new()).unwrap();
    assert_eq!(next.path(), "steps.prompt_completion.output");
}

#[test]
fn test_nested_condition_failure_discards_outer_steps() {
    let mut chain = Chain::new();
    let result = chain.with_condition(true, |chain| {
        chain.add_step("api_call", ParamMap::new())?;
        chain.with_condition(false, |chain| chain.add_step("api_call", ParamMap::new()))
    });
    assert_eq!(result, Err(DefinitionError::ConditionAlreadyActive));
    assert!(chain.steps().is_empty());
    assert!(chain.compile().unwrap().steps().is_empty());
}

#[test]
fn test_foreach_references_only_inside_iteration() {
    let mut chain = Chain::new();
    let mut scope = None;
    chain
        .with_iteration(vec!["a"], |chain, current| {
            scope = Some(current.clone());
            chain.add_step("prompt_completion", params! { "prompt" => current.item })
        })
        .unwrap();
    let scope = scope.unwrap();

    let stray = chain.add_step(
        "api_call",
        params! { "body" => params! { "at" => vec![scope.index.clone()] } },
    );
    assert_eq!(
        stray,
        Err(DefinitionError::IterationReferenceOutsideIteration {
            step: "api_call".to_string(),
            path: "foreach.index".to_string(),
        })
    );

    let in_condition = chain.with_condition(scope.item.field("ok"), |chain| {
        chain.add_step("api_call", ParamMap::new())
    });
    assert!(matches!(
        in_condition,
        Err(DefinitionError::IterationReferenceOutsideIteration { .. })
    ));

    assert_eq!(chain.steps().len(), 1);
    assert_eq!(
        chain.add_step("api_call", ParamMap::new()).unwrap().path(),
        "steps.api_call.output"
    );
}

#[test]
fn test_condition_and_iteration_can_be_combined() {
    let mut chain = Chain::new();
    let results = chain
        .with_condition(Reference::params().field("enabled"), |chain| {
            chain.with_iteration(vec!["x", "y"], |chain, scope| {
                chain.add_step("prompt_completion", params! { "prompt" => scope.item })
            })
        })
        .unwrap();

    assert_eq!(results.path(), "steps.prompt_completion.results");
    let step = &chain.steps()[0];
    assert!(step.condition().is_some());
    assert!(step.is_iterated());
}

#[test]
fn test_define_runs_setup_and_records_output() {
    let chain = create_pdf_qa_chain();
    assert_eq!(chain.title(), "Ask questions about a short PDF");
    assert_eq!(chain.steps().len(), 4);
    assert!(matches!(chain.output(), Some(Output::Mapping(_))));
    assert_eq!(
        chain.params_schema().map(|schema| schema.len()),
        Some(2)
    );
}

#[test]
fn test_define_propagates_setup_errors() {
    let result = Chain::builder().define(|chain, _params| {
        chain.with_iteration(vec![1], |_chain, _scope| Ok(()))?;
        Ok(())
    });
    assert_eq!(
        result.unwrap_err(),
        DefinitionError::IterationStepCount { added: 0 }
    );
}

#[test]
fn test_define_without_output_leaves_it_unset() {
    let chain = Chain::builder()
        .define(|chain, _params| {
            chain.add_step("api_call", ParamMap::new())?;
            Ok(())
        })
        .unwrap();
    assert!(chain.output().is_none());
}

#[test]
fn test_embed_code_adds_a_code_step() {
    let mut chain = Chain::new();
    let answer = chain
        .add_step("prompt_completion", ParamMap::new())
        .unwrap()
        .field("answer");
    let code = chain
        .embed_code([("answer", answer)], "({ answer }) => answer.length")
        .unwrap();

    assert_eq!(code.path(), "steps.js_code_transformation.output");
    let step = chain.step(CODE_TRANSFORMATION).unwrap();
    assert_eq!(step.transformation(), "js_code_transformation");
    assert!(step.params().contains_key("code"));
}

#[test]
fn test_embed_code_rejects_empty_source() {
    let mut chain = Chain::new();
    let result = chain.embed_code(Vec::<(&str, Reference)>::new(), "   ");
    assert_eq!(result, Err(DefinitionError::EmptyCode));
    assert!(chain.steps().is_empty());
}
