use crate::knowledge::KnowledgeDocument;

const LANGUAGE_INSTRUCTION: &str = "Respond in the same language as the user's question, \
or if a specific language is mentioned, use that language.";

const ANSWER_INSTRUCTION: &str = "Based on the following resume information, answer the user's \
question. If the information is not explicitly in the resume, state that you cannot find it.";

const SUMMARY_INSTRUCTION: &str = "Provide a concise summary of the following resume, \
highlighting key skills, experience, and achievements. Format the summary using Markdown.";

const QUESTIONS_INSTRUCTION: &str = "Generate 3-5 common interview questions based on the \
content of the following resume. Focus on areas like experience, projects, and skills. \
Format the questions as a numbered list using Markdown.";

/// What the user asked the assistant to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FreeQuestion(String),
    Summarize,
    GenerateQuestions,
}

/// Build the full instruction string sent to the model for `intent`
pub fn build_prompt(intent: &Intent, document: &KnowledgeDocument) -> String {
    let mut prompt = String::new();

    prompt.push_str(LANGUAGE_INSTRUCTION);
    prompt.push('\n');

    prompt.push_str(match intent {
        Intent::FreeQuestion(_) => ANSWER_INSTRUCTION,
        Intent::Summarize => SUMMARY_INSTRUCTION,
        Intent::GenerateQuestions => QUESTIONS_INSTRUCTION,
    });
    prompt.push_str("\n\n");

    prompt.push_str("Resume:\n");
    prompt.push_str(document.as_str());

    if let Intent::FreeQuestion(question) = intent {
        prompt.push_str("\n\nUser's question: ");
        prompt.push_str(question);
    }

    prompt
}
