use application::persona_service::PersonaContextBuilder;
use application::retrieval_service::{RetrievalOptions, RetrievalPipeline};
use application::tutor_service::{
    ActionOutcome, TutorService, TutorSettings, EMPTY_TOPIC_MESSAGE, ZERO_DURATION_MESSAGE,
};
use domain::errors::CompletionError;
use domain::options::{
    CourseDuration, DurationUnit, LearningRequest, TeachingMode, TeachingStyle,
};
use domain::persona::default_personas;
use domain::session::{SessionContext, UserAction};
use pretty_assertions::assert_eq;
use tests::{FakeCompletion, FakeTranscripts, FakeVideoSearch, LengthEmbedder, RecordingSink};

type FakeTutor = TutorService<FakeCompletion, FakeVideoSearch, FakeTranscripts, LengthEmbedder>;

fn tutor(completion: FakeCompletion) -> FakeTutor {
    TutorService::new(completion, None, default_personas(), TutorSettings::default())
}

fn request(mode: TeachingMode, topic: &str) -> LearningRequest {
    LearningRequest::new("5th Grade", "Mathematics", "English", mode, topic)
}

#[tokio::test]
async fn answered_question_is_recorded_and_topic_cleared() {
    let tutor = tutor(FakeCompletion::replying([Ok("A fraction is part of a whole.".to_string())]));
    let mut session = SessionContext::new();
    let mut sink = RecordingSink::default();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::LearnConcept, "fractions")),
            &mut sink,
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Answered {
            answer: "A fraction is part of a whole.".into()
        }
    );
    assert_eq!(session.history.len(), 1);
    let entry = session.history.get(1).unwrap();
    assert_eq!(entry.question, "fractions");
    assert_eq!(entry.answer, "A fraction is part of a whole.");
    assert_eq!(session.form.topic, "");
    assert!(session.curriculum.is_none());
    assert!(sink.partials.iter().all(|p| p.ends_with('▌')));
    assert_eq!(sink.completed.len(), 1);

    let sent = &tutor.completion().requests()[0];
    assert!(sent.prompt.contains("\"fractions\""));
    assert!(sent.prompt.contains("Content difficulty: Intermediate."));
    assert_eq!(sent.max_tokens, 2048);
    assert!(sent.stream);
}

#[tokio::test]
async fn blank_topic_is_rejected_without_a_request() {
    let tutor = tutor(FakeCompletion::default());
    let mut session = SessionContext::new();
    let mut sink = RecordingSink::default();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::PracticeQuestions, "   ")),
            &mut sink,
        )
        .await;

    assert_eq!(outcome, ActionOutcome::Rejected(EMPTY_TOPIC_MESSAGE.into()));
    assert!(session.history.is_empty());
    assert!(tutor.completion().requests().is_empty());
}

#[tokio::test]
async fn failed_generation_keeps_history_and_topic() {
    let tutor = tutor(FakeCompletion::replying([Err(CompletionError::Status {
        status: 500,
        body: "boom".into(),
    })]));
    let mut session = SessionContext::new();
    session.history.push("earlier", "answer");
    let mut sink = RecordingSink::default();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::GetExplanation, "why is 0.999... = 1")),
            &mut sink,
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error generating response: Error: 500, boom".into())
    );
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.form.topic, "why is 0.999... = 1");
}

#[tokio::test]
async fn stream_cut_off_midway_leaves_session_untouched() {
    let tutor = tutor(FakeCompletion::cut_off_after(
        "Fractions are parts of",
        CompletionError::Network("connection reset".into()),
    ));
    let mut session = SessionContext::new();
    session.history.push("earlier", "answer");
    let mut sink = RecordingSink::default();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::LearnConcept, "fractions")),
            &mut sink,
        )
        .await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error generating response: Network error: connection reset".into())
    );
    assert!(!sink.partials.is_empty());
    assert!(sink.completed.is_empty());
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history.get(1).unwrap().question, "earlier");
    assert_eq!(session.form.topic, "fractions");
}

#[tokio::test]
async fn curriculum_notes_reach_the_prompt() {
    let tutor = tutor(FakeCompletion::replying([Ok("# Week 1".to_string())]));
    let mut session = SessionContext::new();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(
                TeachingMode::GenerateCurriculum,
                "focus on word problems",
            )),
            &mut RecordingSink::default(),
        )
        .await;
    assert!(matches!(outcome, ActionOutcome::Answered { .. }));

    let sent = &tutor.completion().requests()[0];
    assert!(sent
        .prompt
        .contains("\nAdditional notes: focus on word problems"));
}

#[tokio::test]
async fn zero_length_curriculum_is_rejected() {
    let tutor = tutor(FakeCompletion::default());
    let mut session = SessionContext::new();
    let mut curriculum = request(TeachingMode::GenerateCurriculum, "");
    curriculum.duration = CourseDuration {
        value: 0,
        unit: DurationUnit::Weeks,
    };

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(curriculum),
            &mut RecordingSink::default(),
        )
        .await;

    assert_eq!(outcome, ActionOutcome::Rejected(ZERO_DURATION_MESSAGE.into()));
    assert!(tutor.completion().requests().is_empty());
    assert!(session.curriculum.is_none());
}

#[tokio::test]
async fn long_topics_are_truncated() {
    let tutor = tutor(FakeCompletion::replying([Ok("ok".to_string())]));
    let mut session = SessionContext::new();
    let topic = "x".repeat(1500);

    tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::LearnConcept, &topic)),
            &mut RecordingSink::default(),
        )
        .await;

    assert_eq!(session.history.get(1).unwrap().question.chars().count(), 1000);
}

#[tokio::test]
async fn curriculum_can_be_downloaded_after_generation() {
    let dir = tempfile::tempdir().unwrap();
    let tutor = tutor(FakeCompletion::replying([Ok(
        "# Week 1\n- **Counting** to 100\n\nPractice daily.".to_string(),
    )]));
    let mut session = SessionContext::new();
    let mut sink = RecordingSink::default();

    let before = tutor
        .handle(&mut session, UserAction::Download(dir.path().to_path_buf()), &mut sink)
        .await;
    assert_eq!(before, ActionOutcome::NothingToDownload);

    let mut curriculum = request(TeachingMode::GenerateCurriculum, "");
    curriculum.duration = CourseDuration {
        value: 2,
        unit: DurationUnit::Months,
    };
    curriculum.styles = vec![TeachingStyle::Visual, TeachingStyle::Kinesthetic];
    let outcome = tutor
        .handle(&mut session, UserAction::Submit(curriculum), &mut sink)
        .await;
    assert!(matches!(outcome, ActionOutcome::Answered { .. }));

    let draft = session.curriculum.clone().unwrap();
    assert_eq!(draft.duration, "2 Months");
    assert_eq!(session.form.duration.value, 2);

    let sent = &tutor.completion().requests()[0];
    assert_eq!(sent.max_tokens, 4096);
    assert!(sent.prompt.starts_with("Focus on Visual, Kinesthetic learning style. "));
    assert!(sent.prompt.contains("2 months"));
    assert!(!sent.prompt.contains("Content difficulty"));
    assert!(!sent.prompt.contains("Additional notes"));

    let exported = tutor
        .handle(&mut session, UserAction::Download(dir.path().to_path_buf()), &mut sink)
        .await;
    let ActionOutcome::Exported(path) = exported else {
        panic!("expected an exported document, got {exported:?}");
    };
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "5th_Grade_Mathematics_Curriculum.docx"
    );
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn saved_response_is_written_as_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let tutor = tutor(FakeCompletion::default());
    let mut session = SessionContext::new();
    session.history.push("What is 2+2?", "4");
    let mut sink = RecordingSink::default();

    let missing = tutor
        .handle(&mut session, UserAction::Save(2, dir.path().to_path_buf()), &mut sink)
        .await;
    assert_eq!(missing, ActionOutcome::NoSuchEntry(2));

    let saved = tutor
        .handle(&mut session, UserAction::Save(1, dir.path().to_path_buf()), &mut sink)
        .await;
    let ActionOutcome::Saved(path) = saved else {
        panic!("expected a saved file, got {saved:?}");
    };
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("What is 2+2?"));
    assert!(text.contains('4'));
}

#[tokio::test]
async fn clear_resets_the_session() {
    let tutor = tutor(FakeCompletion::default());
    let mut session = SessionContext::new();
    session.history.push("q", "a");
    session.form.topic = "pending".into();

    let outcome = tutor
        .handle(&mut session, UserAction::Clear, &mut RecordingSink::default())
        .await;

    assert_eq!(outcome, ActionOutcome::Cleared);
    assert!(session.history.is_empty());
    assert!(session.curriculum.is_none());
    assert_eq!(session.form.topic, "");
}

#[tokio::test]
async fn persona_without_search_backend_fails_cleanly() {
    let tutor = tutor(FakeCompletion::default());
    let mut session = SessionContext::new();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::Persona("lecun".into()), "CNNs")),
            &mut RecordingSink::default(),
        )
        .await;

    assert!(
        matches!(outcome, ActionOutcome::Failed(message) if message.contains("YOUTUBE_API_KEY"))
    );
    assert!(tutor.completion().requests().is_empty());
}

#[tokio::test]
async fn persona_prompt_uses_transcripts_that_could_be_fetched() {
    let search =
        FakeVideoSearch::with_videos(&[("v1", "Deep Learning Lecture"), ("v2", "Private talk")]);
    let transcripts = FakeTranscripts::default().with(
        "v1",
        &["convolutions share weights", "pooling adds invariance"],
    );
    let retrieval = RetrievalPipeline::new(LengthEmbedder, RetrievalOptions::new(5, 1).unwrap());
    let builder = PersonaContextBuilder::new(search, transcripts, retrieval, 5);
    let tutor = TutorService::new(
        FakeCompletion::replying([Ok("Bonjour students".to_string())]),
        Some(builder),
        default_personas(),
        TutorSettings::default(),
    );
    let mut session = SessionContext::new();

    let outcome = tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::Persona("lecun".into()), "CNNs")),
            &mut RecordingSink::default(),
        )
        .await;
    assert!(matches!(outcome, ActionOutcome::Answered { .. }));

    let prompt = &tutor.completion().requests()[0].prompt;
    assert!(prompt.contains("Transcript for 'Deep Learning Lecture':"));
    assert!(prompt.contains("convolutions share weights"));
    assert!(prompt.contains("pooling adds invariance"));
    assert!(!prompt.contains("Private talk"));
    assert!(prompt.ends_with("CNNs\nContent difficulty: Intermediate."));
}

#[tokio::test]
async fn terminal_renderer_ends_with_the_full_answer() {
    let tutor = tutor(FakeCompletion::replying([Ok("Two plus two is four".to_string())]));
    let mut session = SessionContext::new();
    let mut sink = presentation::renderer::TerminalSink::new(Vec::new());

    tutor
        .handle(
            &mut session,
            UserAction::Submit(request(TeachingMode::GetExplanation, "2+2")),
            &mut sink,
        )
        .await;

    let printed = String::from_utf8(sink.into_inner()).unwrap();
    assert!(printed.ends_with('\n'));
    for word in ["Two", "plus", "two", "is", "four"] {
        assert!(printed.contains(word));
    }
}
