use crate::persona_service::PersonaContextBuilder;
use domain::models::{ChatRequest, CurriculumDraft};
use domain::options::{LearningRequest, TeachingMode, MAX_TOPIC_CHARS};
use domain::persona::{find_persona, Persona};
use domain::ports::{ChatCompletion, EmbeddingModel, StreamSink, TranscriptSource, VideoSearch};
use domain::prompts::{decorate_prompt, mode_prompt};
use domain::session::{SessionContext, UserAction};
use infrastructure::export::{save_entry_markdown, CurriculumDocument};
use shared::utils::truncate_chars;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a question or topic first!";
pub const ZERO_DURATION_MESSAGE: &str = "Course duration must be at least 1.";

/// Result of one user action, ready to be shown.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Answered { answer: String },
    /// Input was refused before anything was sent.
    Rejected(String),
    /// The single user-visible error for a failed action.
    Failed(String),
    Cleared,
    Exported(PathBuf),
    NothingToDownload,
    Saved(PathBuf),
    NoSuchEntry(usize),
}

#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub curriculum_max_tokens: u32,
    pub additional_context: Option<String>,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            curriculum_max_tokens: 4096,
            additional_context: None,
        }
    }
}

/// Event-driven core of the tutor: every action mutates the session it is handed.
pub struct TutorService<C, V, T, E> {
    completion: C,
    persona_builder: Option<PersonaContextBuilder<V, T, E>>,
    personas: Vec<Persona>,
    settings: TutorSettings,
}

impl<C, V, T, E> TutorService<C, V, T, E>
where
    C: ChatCompletion,
    V: VideoSearch,
    T: TranscriptSource,
    E: EmbeddingModel,
{
    pub fn new(
        completion: C,
        persona_builder: Option<PersonaContextBuilder<V, T, E>>,
        personas: Vec<Persona>,
        settings: TutorSettings,
    ) -> Self {
        Self {
            completion,
            persona_builder,
            personas,
            settings,
        }
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    pub async fn handle<S: StreamSink + Send>(
        &self,
        session: &mut SessionContext,
        action: UserAction,
        sink: &mut S,
    ) -> ActionOutcome {
        match action {
            UserAction::Submit(request) => self.submit(session, request, sink).await,
            UserAction::Clear => {
                session.reset();
                ActionOutcome::Cleared
            }
            UserAction::Download(dir) => download(session, &dir),
            UserAction::Save(number, dir) => save(session, number, &dir),
        }
    }

    async fn compose_prompt(&self, request: &LearningRequest) -> Result<String, String> {
        let base = match &request.mode {
            TeachingMode::Persona(id) => {
                let persona = find_persona(&self.personas, id)
                    .ok_or_else(|| format!("Unknown persona '{id}'"))?;
                let builder = self.persona_builder.as_ref().ok_or_else(|| {
                    "Persona mode needs a video search API key (set YOUTUBE_API_KEY)".to_string()
                })?;
                info!(persona = %persona.id, "{} is on the way", persona.label());
                builder.build_prompt(persona, &request.topic).await
            }
            _ => mode_prompt(request).ok_or_else(|| "Unsupported mode".to_string())?,
        };
        Ok(decorate_prompt(
            &base,
            request,
            self.settings.additional_context.as_deref(),
        ))
    }

    async fn submit<S: StreamSink + Send>(
        &self,
        session: &mut SessionContext,
        mut request: LearningRequest,
        sink: &mut S,
    ) -> ActionOutcome {
        request.topic = truncate_chars(&request.topic, MAX_TOPIC_CHARS).to_string();
        let is_curriculum = request.mode.is_curriculum();
        session.form.topic = request.topic.clone();
        session.form.duration = request.duration;

        if !is_curriculum && request.topic.trim().is_empty() {
            return ActionOutcome::Rejected(EMPTY_TOPIC_MESSAGE.to_string());
        }
        if is_curriculum && request.duration.value == 0 {
            return ActionOutcome::Rejected(ZERO_DURATION_MESSAGE.to_string());
        }

        let prompt = match self.compose_prompt(&request).await {
            Ok(prompt) => prompt,
            Err(message) => return ActionOutcome::Failed(message),
        };
        let max_tokens = if is_curriculum {
            self.settings.curriculum_max_tokens
        } else {
            self.settings.max_tokens
        };
        let chat = ChatRequest::streaming(prompt, self.settings.temperature, max_tokens);

        // Only a completed stream touches the history.
        match self.completion.stream_chat(&chat, sink).await {
            Ok(answer) => {
                session.history.push(&request.topic, &answer);
                session.form.topic.clear();
                if is_curriculum {
                    session.curriculum = Some(CurriculumDraft {
                        content: answer.clone(),
                        grade: request.grade.clone(),
                        subject: request.subject.clone(),
                        duration: request.duration.to_string(),
                    });
                }
                ActionOutcome::Answered { answer }
            }
            Err(e) => {
                debug!(error = %e, "generation failed");
                ActionOutcome::Failed(format!("Error generating response: {e}"))
            }
        }
    }
}

fn download(session: &SessionContext, dir: &Path) -> ActionOutcome {
    let Some(draft) = session.curriculum.as_ref() else {
        return ActionOutcome::NothingToDownload;
    };
    match CurriculumDocument::new(draft).write_to(dir) {
        Ok(path) => ActionOutcome::Exported(path),
        Err(e) => ActionOutcome::Failed(format!("Error generating document: {e:#}")),
    }
}

fn save(session: &SessionContext, number: usize, dir: &Path) -> ActionOutcome {
    let Some(entry) = session.history.get(number) else {
        return ActionOutcome::NoSuchEntry(number);
    };
    match save_entry_markdown(entry, number, dir) {
        Ok(path) => ActionOutcome::Saved(path),
        Err(e) => ActionOutcome::Failed(format!("Error saving response: {e:#}")),
    }
}
