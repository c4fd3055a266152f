//! Chains bundled with the CLI.

use stepchain::prelude::*;

pub struct Demo {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: fn() -> Result<Chain, DefinitionError>,
}

pub const DEMOS: &[Demo] = &[
    Demo {
        name: "pdf-question-answer",
        summary: "Search a short PDF and answer a question about it",
        build: pdf_question_answer,
    },
    Demo {
        name: "long-pdf-summarise",
        summary: "Summarise every chunk of a long PDF, then join the summaries",
        build: long_pdf_summarise,
    },
    Demo {
        name: "edit-csv",
        summary: "Ask an LLM to edit an uploaded CSV and export the result",
        build: edit_csv,
    },
    Demo {
        name: "shout-story",
        summary: "Write a story, then upper-case it with inline code",
        build: shout_story,
    },
];

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

fn pdf_question_answer() -> Result<Chain, DefinitionError> {
    Chain::builder()
        .title("Ask questions about a short PDF")
        .publicly_triggerable(true)
        .param("pdf_url", ParamSchema::string())
        .param("question", ParamSchema::string())
        .define(|chain, params| {
            let question = params.field("question");
            let text = chain
                .add_step("pdf_to_text", params! { "pdf_url" => params.field("pdf_url") })?
                .field("text");
            let chunks = chain
                .add_step(
                    "split_text",
                    params! { "method" => "tokens", "num_tokens" => 500, "text" => text },
                )?
                .field("chunks");
            let search_results = chain
                .add_step("search_array", params! { "array" => chunks, "query" => &question })?
                .field("results");
            let prompt = format!(
                "\n{}\n\nBased off the above context answer the question below:\n\nQuestion: \n{}\n\nAnswer:",
                search_results.to_template_string(),
                question.to_template_string(),
            );
            let answer = chain
                .add_step("prompt_completion", params! { "prompt" => prompt })?
                .field("answer");
            Ok(Output::mapping([("answer", answer)]))
        })
}

fn long_pdf_summarise() -> Result<Chain, DefinitionError> {
    Chain::builder()
        .param("pdf_url", ParamSchema::string())
        .define(|chain, params| {
            let text = chain
                .add_step("pdf_to_text", params! { "pdf_url" => params.field("pdf_url") })?
                .field("text");
            let chunks = chain
                .add_step(
                    "split_text",
                    params! { "method" => "tokens", "num_tokens" => 200, "text" => text },
                )?
                .field("chunks");
            let results = chain.with_iteration(&chunks, |chain, scope| {
                let prompt = format!(
                    "\n{}\n\nSummarise the above text.",
                    scope.item.to_template_string()
                );
                chain.add_step("prompt_completion", params! { "prompt" => prompt })
            })?;
            let summary = chain
                .add_step(
                    "join_array",
                    params! { "array" => results.each().field("answer"), "sep" => "\n" },
                )?
                .field("text");
            Ok(Output::mapping([("summary", summary)]))
        })
}

fn edit_csv() -> Result<Chain, DefinitionError> {
    Chain::builder()
        .title("Edit CSV")
        .description(
            "Upload a csv, and ask for the llm to edit it. For example, you could ask it \
             'Add a category column based on the description column.'",
        )
        .param("question", ParamSchema::string())
        .param(
            "file_url",
            ParamSchema::string().with_content_type(ContentType::FileUrl),
        )
        .define(|chain, params| {
            let file_contents = chain
                .add_step(
                    "api_call",
                    params! { "url" => params.field("file_url"), "method" => "GET" },
                )?
                .field("response_body");
            let transformed_csv = chain
                .add_step(
                    "prompt_completion",
                    params! {
                        "prompt" => format!(
                            "{}\n\nRequest: \n{}\n\nTransform the above csv content based on the request, and only output the transformed csv.\n\nAnswer:",
                            file_contents.to_template_string(),
                            params.field("question").to_template_string(),
                        ),
                    },
                )?
                .field("answer");
            let markdown_table = chain
                .add_step(
                    "prompt_completion",
                    params! {
                        "prompt" => format!(
                            "{}\n\nTurn the above csv into markdown table format. Only output the table.",
                            transformed_csv.to_template_string(),
                        ),
                    },
                )?
                .field("answer");
            let export_url = chain
                .add_step(
                    "export_to_file",
                    params! { "data" => &transformed_csv, "extension" => "csv" },
                )?
                .field("export_url");
            Ok(Output::mapping([
                ("markdownTable", markdown_table),
                ("export_url", export_url),
            ]))
        })
}

fn shout_story() -> Result<Chain, DefinitionError> {
    Chain::builder().define(|chain, _params| {
        let answer = chain
            .add_step(
                "prompt_completion",
                params! { "prompt" => "write a short story about dogs" },
            )?
            .field("answer");
        chain.embed_code(
            [("answer", answer)],
            r#"({ answer }) => answer.toUpperCase().split(" ").join("\n")"#,
        )
    })
}
