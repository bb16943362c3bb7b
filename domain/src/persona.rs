use crate::prompts::render_template;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::types::Result;

/// A teaching persona. Templates take `{name}`, `{topic}` and, for the prompt, `{context}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub search_query: String,
    pub prompt: String,
}

impl Persona {
    pub fn search_query(&self, topic: &str) -> String {
        render_template(&self.search_query, &[("name", &self.name), ("topic", topic)])
    }

    pub fn prompt(&self, context: &str, topic: &str) -> String {
        render_template(
            &self.prompt,
            &[("name", &self.name), ("context", context), ("topic", topic)],
        )
    }

    pub fn label(&self) -> String {
        format!("Prof. {}", self.name)
    }
}

pub fn default_personas() -> Vec<Persona> {
    vec![Persona {
        id: "lecun".to_string(),
        name: "Yann LeCun".to_string(),
        search_query: "{name}'s brief explanation on {topic}".to_string(),
        prompt: "Take on the persona of Professor {name} and explain things strictly from the \
following lecture material:\n{context}\n\nSpeak just like he would in a lecture. Start by greeting the \
students as Prof. {name}, introduce the topic concisely, and then explain it with real-world examples \
and practical applications. Keep the explanations brief but insightful. End by inviting students to \
ask questions if they have any doubts. The topic for today's explanation is: {topic}"
            .to_string(),
    }]
}

/// Parse a JSON array of personas, rejecting empty or duplicate ids.
pub fn parse_personas(json: &str) -> Result<Vec<Persona>> {
    let personas: Vec<Persona> =
        serde_json::from_str(json).context("Invalid personas file: expected a JSON array")?;
    for (i, persona) in personas.iter().enumerate() {
        if persona.id.trim().is_empty() {
            anyhow::bail!("Persona #{} has an empty id", i + 1);
        }
        if personas[..i].iter().any(|p| p.id == persona.id) {
            anyhow::bail!("Duplicate persona id '{}'", persona.id);
        }
    }
    Ok(personas)
}

pub fn find_persona<'a>(personas: &'a [Persona], id: &str) -> Option<&'a Persona> {
    personas.iter().find(|p| p.id == id)
}
