use crate::renderer::TerminalSink;
use application::persona_service::PersonaContextBuilder;
use application::retrieval_service::{RetrievalOptions, RetrievalPipeline};
use application::tutor_service::{ActionOutcome, TutorService, TutorSettings};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use domain::options::{
    CourseDuration, Difficulty, DurationUnit, LearningRequest, TeachingMode, TeachingStyle,
    GRADES, LANGUAGES, SUBJECTS,
};
use domain::persona::{default_personas, parse_personas, Persona};
use domain::session::{SessionContext, UserAction};
use infrastructure::completion_client::CompletionClient;
use infrastructure::config::Config;
use infrastructure::context_loader::load_context_file;
use infrastructure::embedder::Embedder;
use infrastructure::transcript::TimedTextTranscripts;
use infrastructure::video_search::YoutubeSearchClient;
use shared::confirmation::ask_confirmation;
use shared::types::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

pub type Tutor =
    TutorService<CompletionClient, YoutubeSearchClient, TimedTextTranscripts, Embedder>;

#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(about = "Personal tutor backed by a local language model")]
pub struct Cli {
    /// Check that the completion server is up and exit
    #[arg(long)]
    pub health: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Text or PDF file prepended to every prompt as curriculum context
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    #[arg(long, default_value = "5th Grade")]
    pub grade: String,

    #[arg(long, default_value = "Mathematics")]
    pub subject: String,

    #[arg(long, default_value = "English")]
    pub language: String,

    /// learn, practice, explain, curriculum or persona:<id>; runs once and exits
    #[arg(long)]
    pub mode: Option<TeachingMode>,

    /// Learning objectives appended to the prompt
    #[arg(long, default_value = "")]
    pub objectives: String,

    /// Curriculum length, at least 1
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    pub duration: u32,

    /// weeks, months or semesters
    #[arg(long, default_value = "weeks")]
    pub unit: DurationUnit,

    /// The question or topic
    #[arg(trailing_var_arg = true)]
    pub topic: Vec<String>,
}

impl Cli {
    pub fn topic(&self) -> String {
        self.topic.join(" ")
    }

    pub fn is_one_shot(&self) -> bool {
        self.mode.is_some() || !self.topic.is_empty()
    }

    pub fn to_request(&self) -> LearningRequest {
        let mode = self.mode.clone().unwrap_or(TeachingMode::LearnConcept);
        let mut request =
            LearningRequest::new(&self.grade, &self.subject, &self.language, mode, &self.topic());
        request.objectives = self.objectives.clone();
        request.duration = CourseDuration {
            value: self.duration,
            unit: self.unit,
        };
        request
    }
}

/// Form fields that persist between questions in an interactive session.
#[derive(Debug, Clone)]
struct Preferences {
    grade: String,
    subject: String,
    language: String,
    difficulty: Option<Difficulty>,
    styles: Vec<TeachingStyle>,
    objectives: String,
}

impl Preferences {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            grade: cli.grade.clone(),
            subject: cli.subject.clone(),
            language: cli.language.clone(),
            difficulty: Some(Difficulty::default()),
            styles: Vec::new(),
            objectives: cli.objectives.clone(),
        }
    }

    fn request(
        &self,
        mode: TeachingMode,
        topic: &str,
        duration: CourseDuration,
    ) -> LearningRequest {
        let mut request =
            LearningRequest::new(&self.grade, &self.subject, &self.language, mode, topic);
        request.difficulty = self.difficulty;
        request.styles = self.styles.clone();
        request.objectives = self.objectives.clone();
        request.duration = duration;
        request
    }
}

/// Personas from `TUTOR_PERSONAS_FILE`, or the built-in set.
pub fn load_personas(config: &Config) -> Result<Vec<Persona>> {
    match &config.personas_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            parse_personas(&raw)
        }
        None => Ok(default_personas()),
    }
}

/// Wire the tutor from configuration. Persona mode is only available with a video search key.
pub fn build_tutor(config: &Config, additional_context: Option<String>) -> Result<Tutor> {
    let client = CompletionClient::new(config)?;
    let personas = load_personas(config)?;

    let persona_builder = match &config.youtube_api_key {
        Some(key) => {
            let options =
                RetrievalOptions::new(config.retrieval_top_k, config.retrieval_chunk_size)?;
            let embedder = Embedder::from_config(config, client.clone());
            Some(PersonaContextBuilder::new(
                YoutubeSearchClient::new(&config.youtube_api_base, key),
                TimedTextTranscripts::new(&config.transcript_api_base, &config.transcript_lang),
                RetrievalPipeline::new(embedder, options),
                config.youtube_max_results,
            ))
        }
        None => {
            debug!("no YOUTUBE_API_KEY; persona mode disabled");
            None
        }
    };

    let settings = TutorSettings {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        curriculum_max_tokens: config.curriculum_max_tokens,
        additional_context,
    };
    Ok(TutorService::new(client, persona_builder, personas, settings))
}

pub struct CliApp {
    config: Config,
    session: SessionContext,
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: SessionContext::new(),
        }
    }

    /// Failures the tutor already reported on screen turn into a non-zero exit
    /// code rather than an error, so they are not printed twice.
    pub async fn run(&mut self, cli: Cli) -> Result<ExitCode> {
        if cli.health {
            self.handle_health().await?;
            return Ok(ExitCode::SUCCESS);
        }

        let additional_context = match &cli.context {
            Some(path) => {
                let text = load_context_file(path)?;
                info!(
                    path = %path.display(),
                    chars = text.chars().count(),
                    "loaded curriculum context"
                );
                println!("{}", format!("Context loaded from {}", path.display()).green());
                Some(text)
            }
            None => None,
        };
        let tutor = build_tutor(&self.config, additional_context)?;

        if cli.is_one_shot() {
            self.handle_once(&tutor, cli.to_request()).await
        } else {
            self.handle_interactive(&tutor, Preferences::from_cli(&cli)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }

    async fn handle_health(&self) -> Result<()> {
        let client = CompletionClient::new(&self.config)?;
        let health = client.check_health().await?;
        println!(
            "{} {} ({})",
            "Server status:".green(),
            health.status,
            client.base_url()
        );
        Ok(())
    }

    async fn handle_once(&mut self, tutor: &Tutor, request: LearningRequest) -> Result<ExitCode> {
        let is_curriculum = request.mode.is_curriculum();
        let mut outcome = self.submit(tutor, request).await;
        if is_curriculum && matches!(outcome, ActionOutcome::Answered { .. }) {
            outcome = self
                .dispatch(tutor, UserAction::Download(self.config.export_dir.clone()))
                .await;
        }
        Ok(if succeeded(&outcome) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    async fn handle_interactive(&mut self, tutor: &Tutor, mut prefs: Preferences) -> Result<()> {
        let theme = ColorfulTheme::default();
        println!("{}", "Personal tutor. Pick an action below.".bold());
        let menu = [
            "Ask a question",
            "Generate curriculum",
            "Show history",
            "Download curriculum",
            "Save a response",
            "Clear history",
            "Settings",
            "Quit",
        ];

        loop {
            let choice = Select::with_theme(&theme)
                .with_prompt(format!("{} | {} | {}", prefs.grade, prefs.subject, prefs.language))
                .items(&menu)
                .default(0)
                .interact()?;

            match choice {
                0 => self.ask(tutor, &prefs, &theme).await?,
                1 => self.curriculum(tutor, &prefs, &theme).await?,
                2 => self.show_history(),
                3 => {
                    self.dispatch(tutor, UserAction::Download(self.config.export_dir.clone()))
                        .await;
                }
                4 => self.save_response(tutor, &theme).await?,
                5 => {
                    if ask_confirmation("Clear the conversation history?", false)? {
                        self.dispatch(tutor, UserAction::Clear).await;
                    }
                }
                6 => edit_preferences(&mut prefs, &theme)?,
                _ => break,
            }
        }
        Ok(())
    }

    async fn ask(
        &mut self,
        tutor: &Tutor,
        prefs: &Preferences,
        theme: &ColorfulTheme,
    ) -> Result<()> {
        let mut modes: Vec<TeachingMode> = TeachingMode::BUILT_IN
            .iter()
            .filter(|m| !m.is_curriculum())
            .cloned()
            .collect();
        modes.extend(tutor.personas().iter().map(|p| TeachingMode::Persona(p.id.clone())));
        let labels: Vec<String> = modes
            .iter()
            .map(|mode| match mode {
                TeachingMode::Persona(id) => tutor
                    .personas()
                    .iter()
                    .find(|p| &p.id == id)
                    .map(|p| p.label())
                    .unwrap_or_else(|| id.clone()),
                other => other.label().to_string(),
            })
            .collect();

        let picked = Select::with_theme(theme)
            .with_prompt("Mode")
            .items(&labels)
            .default(0)
            .interact()?;
        let topic: String = Input::with_theme(theme)
            .with_prompt("Enter your question or topic")
            .with_initial_text(self.session.form.topic.clone())
            .allow_empty(true)
            .interact_text()?;

        let request = prefs.request(modes[picked].clone(), &topic, self.session.form.duration);
        self.submit(tutor, request).await;
        Ok(())
    }

    async fn curriculum(
        &mut self,
        tutor: &Tutor,
        prefs: &Preferences,
        theme: &ColorfulTheme,
    ) -> Result<()> {
        let current = self.session.form.duration;
        let value: u32 = Input::with_theme(theme)
            .with_prompt("Course duration")
            .default(current.value)
            .validate_with(|value: &u32| -> std::result::Result<(), &str> {
                if *value >= 1 {
                    Ok(())
                } else {
                    Err("Duration must be at least 1")
                }
            })
            .interact_text()?;
        let unit_labels: Vec<&str> = DurationUnit::ALL.iter().map(|u| u.label()).collect();
        let unit_index = DurationUnit::ALL
            .iter()
            .position(|u| *u == current.unit)
            .unwrap_or(0);
        let unit = Select::with_theme(theme)
            .with_prompt("Unit")
            .items(&unit_labels)
            .default(unit_index)
            .interact()?;
        let topic: String = Input::with_theme(theme)
            .with_prompt("Additional notes (optional)")
            .with_initial_text(self.session.form.topic.clone())
            .allow_empty(true)
            .interact_text()?;

        let duration = CourseDuration {
            value,
            unit: DurationUnit::ALL[unit],
        };
        let request = prefs.request(TeachingMode::GenerateCurriculum, &topic, duration);
        let outcome = self.submit(tutor, request).await;
        if matches!(outcome, ActionOutcome::Answered { .. })
            && ask_confirmation("Download curriculum as .docx?", true)?
        {
            self.dispatch(tutor, UserAction::Download(self.config.export_dir.clone()))
                .await;
        }
        Ok(())
    }

    fn show_history(&self) {
        if self.session.history.is_empty() {
            println!("{}", "No questions yet.".yellow());
            return;
        }
        for (number, entry) in self.session.history.recent_first() {
            println!("{} {}", format!("Q{number}:").blue().bold(), entry.question);
            println!("{} {}\n", format!("A{number}:").green().bold(), entry.answer);
        }
    }

    async fn save_response(&mut self, tutor: &Tutor, theme: &ColorfulTheme) -> Result<()> {
        let len = self.session.history.len();
        if len == 0 {
            println!("{}", "No responses to save.".yellow());
            return Ok(());
        }
        let number: usize = Input::with_theme(theme)
            .with_prompt(format!("Response number (1-{len})"))
            .default(len)
            .interact_text()?;
        self.dispatch(tutor, UserAction::Save(number, self.config.export_dir.clone()))
            .await;
        Ok(())
    }

    async fn submit(&mut self, tutor: &Tutor, request: LearningRequest) -> ActionOutcome {
        if let TeachingMode::Persona(id) = &request.mode {
            if let Some(persona) = tutor.personas().iter().find(|p| &p.id == id) {
                println!("{}", format!("{} is on the way...", persona.label()).cyan());
            }
        }
        self.dispatch(tutor, UserAction::Submit(request)).await
    }

    async fn dispatch(&mut self, tutor: &Tutor, action: UserAction) -> ActionOutcome {
        let mut sink = TerminalSink::stdout();
        let outcome = tutor.handle(&mut self.session, action, &mut sink).await;
        if matches!(outcome, ActionOutcome::Failed(_)) {
            sink.abandon();
        }
        render_outcome(&outcome);
        outcome
    }
}

/// One-shot runs fail when the tutor could not produce what was asked for.
fn succeeded(outcome: &ActionOutcome) -> bool {
    !matches!(
        outcome,
        ActionOutcome::Rejected(_)
            | ActionOutcome::Failed(_)
            | ActionOutcome::NothingToDownload
            | ActionOutcome::NoSuchEntry(_)
    )
}

fn render_outcome(outcome: &ActionOutcome) {
    match outcome {
        // Already streamed to the terminal.
        ActionOutcome::Answered { .. } => {}
        ActionOutcome::Rejected(message) => println!("{}", message.yellow()),
        ActionOutcome::Failed(message) => println!("{}", message.red()),
        ActionOutcome::Cleared => println!("{}", "History cleared.".green()),
        ActionOutcome::Exported(path) => {
            println!("{}", format!("Curriculum saved to {}", path.display()).green())
        }
        ActionOutcome::NothingToDownload => {
            println!("{}", "Generate a curriculum first.".yellow())
        }
        ActionOutcome::Saved(path) => {
            println!("{}", format!("Response saved to {}", path.display()).green())
        }
        ActionOutcome::NoSuchEntry(number) => {
            println!("{}", format!("There is no response #{number}.").yellow())
        }
    }
}

fn select_from(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[&str],
    current: &str,
) -> Result<String> {
    let default = items.iter().position(|item| *item == current).unwrap_or(0);
    let index = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?;
    Ok(items[index].to_string())
}

fn edit_preferences(prefs: &mut Preferences, theme: &ColorfulTheme) -> Result<()> {
    prefs.grade = select_from(theme, "Grade", GRADES, &prefs.grade)?;
    prefs.subject = select_from(theme, "Subject", SUBJECTS, &prefs.subject)?;
    prefs.language = select_from(theme, "Language", LANGUAGES, &prefs.language)?;

    let difficulties: Vec<&str> = std::iter::once("Not set")
        .chain(Difficulty::ALL.iter().map(|d| d.label()))
        .collect();
    let current = prefs.difficulty.map(|d| d.label()).unwrap_or("Not set");
    let picked = select_from(theme, "Difficulty", &difficulties, current)?;
    prefs.difficulty = Difficulty::ALL.iter().copied().find(|d| d.label() == picked);

    let style_labels: Vec<&str> = TeachingStyle::ALL.iter().map(|s| s.label()).collect();
    let checked: Vec<bool> = TeachingStyle::ALL
        .iter()
        .map(|s| prefs.styles.contains(s))
        .collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Teaching styles (space to toggle)")
        .items(&style_labels)
        .defaults(&checked)
        .interact()?;
    prefs.styles = chosen.into_iter().map(|i| TeachingStyle::ALL[i]).collect();

    prefs.objectives = Input::with_theme(theme)
        .with_prompt("Learning objectives")
        .with_initial_text(prefs.objectives.clone())
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
