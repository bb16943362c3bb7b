use crate::options::{LearningRequest, TeachingMode};

pub const LEARN_CONCEPT_PROMPT: &str = "You are a patient and encouraging teacher for {grade} students. \
Teach the {subject} concept \"{topic}\" step by step. Start from what a {grade} student already knows, \
introduce the key ideas one at a time, and use simple real-world examples. \
Finish with a short summary of the main points. Respond in {language}.";

pub const PRACTICE_QUESTIONS_PROMPT: &str = "You are a {subject} teacher preparing practice material for {grade} students. \
Write 5 practice questions about \"{topic}\" that gradually increase in difficulty. \
After the questions, give an answer key with a brief explanation for each answer. Respond in {language}.";

pub const GET_EXPLANATION_PROMPT: &str = "You are a helpful {subject} tutor for {grade} students. \
A student asked: \"{topic}\". Explain the answer clearly and concisely, point out common mistakes, \
and check understanding with one follow-up question. Respond in {language}.";

pub const CURRICULUM_PROMPT: &str = "You are an experienced curriculum designer. \
Create a detailed {subject} curriculum for {grade} students that runs for {duration_value} {duration_unit}. \
Organise the plan by week. For every week list the topics, the learning objectives, suggested classroom \
activities and an assessment idea. Use Markdown headings for each week and bullet points for the details. \
Write the whole curriculum in {language}.";

/// Substitute `{key}` placeholders. Unknown placeholders are left as written.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Base prompt for the built-in modes. Persona prompts are built elsewhere.
pub fn mode_prompt(request: &LearningRequest) -> Option<String> {
    let template = match request.mode {
        TeachingMode::LearnConcept => LEARN_CONCEPT_PROMPT,
        TeachingMode::PracticeQuestions => PRACTICE_QUESTIONS_PROMPT,
        TeachingMode::GetExplanation => GET_EXPLANATION_PROMPT,
        TeachingMode::GenerateCurriculum => {
            let value = request.duration.value.to_string();
            let unit = request.duration.unit.label().to_lowercase();
            let mut prompt = render_template(
                CURRICULUM_PROMPT,
                &[
                    ("grade", &request.grade),
                    ("subject", &request.subject),
                    ("duration_value", &value),
                    ("duration_unit", &unit),
                    ("language", &request.language),
                ],
            );
            let notes = request.topic.trim();
            if !notes.is_empty() {
                prompt.push_str(&format!("\nAdditional notes: {notes}"));
            }
            return Some(prompt);
        }
        TeachingMode::Persona(_) => return None,
    };
    Some(render_template(
        template,
        &[
            ("grade", &request.grade),
            ("subject", &request.subject),
            ("topic", &request.topic),
            ("language", &request.language),
        ],
    ))
}

/// Wrap a base prompt with difficulty, objectives, teaching styles and curriculum context.
pub fn decorate_prompt(
    base: &str,
    request: &LearningRequest,
    additional_context: Option<&str>,
) -> String {
    let mut prompt = base.to_string();

    if !request.mode.is_curriculum() {
        if let Some(difficulty) = request.difficulty {
            prompt.push_str(&format!("\nContent difficulty: {}.", difficulty.label()));
        }
    }
    let objectives = request.objectives.trim();
    if !objectives.is_empty() {
        prompt.push_str(&format!("\nLearning objectives: {objectives}"));
    }

    if !request.styles.is_empty() {
        let styles = request
            .styles
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ");
        prompt = format!("Focus on {styles} learning style. {prompt}");
    }

    match additional_context.map(str::trim) {
        Some(ctx) if !ctx.is_empty() => {
            format!("Using this curriculum context:\n{ctx}\n\n{prompt}")
        }
        _ => prompt,
    }
}
