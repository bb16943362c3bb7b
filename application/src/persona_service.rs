use crate::retrieval_service::RetrievalPipeline;
use domain::models::captions_to_text;
use domain::persona::Persona;
use domain::ports::{EmbeddingModel, TranscriptSource, VideoSearch};
use tracing::{debug, info, warn};

/// Gathers lecture material for a persona: video search, transcripts, retrieval.
pub struct PersonaContextBuilder<V, T, E> {
    search: V,
    transcripts: T,
    retrieval: RetrievalPipeline<E>,
    max_results: usize,
}

impl<V, T, E> PersonaContextBuilder<V, T, E>
where
    V: VideoSearch,
    T: TranscriptSource,
    E: EmbeddingModel,
{
    pub fn new(
        search: V,
        transcripts: T,
        retrieval: RetrievalPipeline<E>,
        max_results: usize,
    ) -> Self {
        Self {
            search,
            transcripts,
            retrieval,
            max_results,
        }
    }

    /// Relevant transcript passages for `topic`, one block per usable video.
    /// Every per-video failure is logged and skipped.
    pub async fn gather_context(&self, persona: &Persona, topic: &str) -> String {
        let query = persona.search_query(topic);
        let videos = match self.search.search(&query, self.max_results).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, %query, "video search failed");
                Vec::new()
            }
        };
        info!(count = videos.len(), persona = %persona.id, "found candidate videos");

        let mut combined = String::new();
        for video in videos {
            let captions = match self.transcripts.fetch(&video.video_id).await {
                Ok(captions) => captions,
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "skipping video");
                    continue;
                }
            };
            let transcript = captions_to_text(&captions);
            let passage = match self.retrieval.relevant_passage(&transcript, topic).await {
                Ok(passage) => passage,
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "retrieval failed");
                    continue;
                }
            };
            if passage.is_empty() {
                debug!(video_id = %video.video_id, "no relevant passage");
                continue;
            }
            combined.push_str(&format!("Transcript for '{}':\n{}\n\n", video.title, passage));
        }
        combined
    }

    pub async fn build_prompt(&self, persona: &Persona, topic: &str) -> String {
        let context = self.gather_context(persona, topic).await;
        persona.prompt(&context, topic)
    }
}
