//! Common chain fixtures shared by the integration tests.
use stepchain::prelude::*;

/// The short-PDF question answering chain.
///
/// `pdf_to_text -> split_text -> search_array -> prompt_completion`, with the
/// completion's answer as the only output key.
#[allow(dead_code)]
pub fn create_pdf_qa_chain() -> Chain {
    Chain::builder()
        .title("Ask questions about a short PDF")
        .param("pdf_url", ParamSchema::string())
        .param("question", ParamSchema::string())
        .define(|chain, params| {
            let pdf = chain.add_step("pdf_to_text", params! { "pdf_url" => params.field("pdf_url") })?;
            let split = chain.add_step(
                "split_text",
                params! { "method" => "tokens", "num_tokens" => 500, "text" => pdf.field("text") },
            )?;
            let search = chain.add_step(
                "search_array",
                params! { "array" => split.field("chunks"), "query" => params.field("question") },
            )?;
            let prompt = format!(
                "{}\n\nAnswer the question: {}",
                search.field("results").to_template_string(),
                params.field("question").to_template_string(),
            );
            let completion = chain.add_step("prompt_completion", params! { "prompt" => prompt })?;
            Ok(Output::mapping([("answer", completion.field("answer"))]))
        })
        .expect("pdf question answering chain should define")
}

/// The long-PDF summary chain: one completion per chunk, then a join.
#[allow(dead_code)]
pub fn create_summary_chain() -> Chain {
    Chain::builder()
        .param("pdf_url", ParamSchema::string())
        .define(|chain, params| {
            let pdf = chain.add_step("pdf_to_text", params! { "pdf_url" => params.field("pdf_url") })?;
            let split = chain.add_step(
                "split_text",
                params! { "method" => "tokens", "num_tokens" => 200, "text" => pdf.field("text") },
            )?;
            let results = chain.with_iteration(split.field("chunks"), |chain, scope| {
                let prompt = format!("{}\n\nSummarise the above.", scope.item.to_template_string());
                chain.add_step("prompt_completion", params! { "prompt" => prompt })
            })?;
            let joined = chain.add_step(
                "join_array",
                params! { "array" => results.each().field("answer"), "sep" => "\n" },
            )?;
            Ok(Output::mapping([("summary", joined.field("text"))]))
        })
        .expect("summary chain should define")
}

/// A chain with no params, a single step and no explicit output.
#[allow(dead_code)]
pub fn create_single_step_chain() -> Chain {
    let mut chain = Chain::new();
    chain
        .add_step("prompt_completion", params! { "prompt" => "hello" })
        .expect("step should be added");
    chain
}
