//! The five-stage article pipeline.

use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

use super::context::RunContext;
use crate::artifact::ArticleArtifact;
use crate::completion::CompletionClient;
use crate::config::{ArticleflowConfig, ContentConfig, RetryConfig};
use crate::contracts::{validate, StageSchema};
use crate::errors::ArticleflowError;
use crate::events::{names, EventSink, NoOpEventSink};
use crate::html::{clean_html_response, strip_html_fences};
use crate::observability::SpanTimer;
use crate::parser::parse_structured;
use crate::prompts;
use crate::retry::RetryPolicy;
use crate::stages::{
    OutlineResult, OutlineSection, ReferencesResult, ResearchResult, SeoReport, StageTag,
    EXPAND_LABEL, SUMMARIZE_LABEL,
};

/// Sequences the article stages over a shared completion client.
///
/// Stages run strictly in order and each consumes only the validated
/// results before it. A failure in stages 1 to 4 aborts the run; a failure
/// in stage 5 is replaced by [`SeoReport::fallback`].
pub struct ArticlePipeline {
    client: Arc<CompletionClient>,
    retry: RetryPolicy,
    content: ContentConfig,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ArticlePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticlePipeline")
            .field("client", &self.client)
            .field("retry", &self.retry)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl ArticlePipeline {
    /// Creates a pipeline with default content settings and no event sink.
    #[must_use]
    pub fn new(client: Arc<CompletionClient>, retry: RetryConfig) -> Self {
        Self {
            client,
            retry: RetryPolicy::new(retry),
            content: ContentConfig::default(),
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Creates a pipeline from the full configuration.
    #[must_use]
    pub fn from_config(client: Arc<CompletionClient>, config: &ArticleflowConfig) -> Self {
        Self::new(client, config.retry.clone()).with_content(config.content.clone())
    }

    /// Sets the sink that receives stage and retry events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.retry = self.retry.with_event_sink(Arc::clone(&sink));
        self.events = sink;
        self
    }

    /// Sets the content settings.
    #[must_use]
    pub fn with_content(mut self, content: ContentConfig) -> Self {
        self.content = content;
        self
    }

    /// Returns the completion client.
    #[must_use]
    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    /// Runs all five stages for `subject` and assembles the article.
    pub async fn generate_article(
        &self,
        subject: &str,
        requester_id: &str,
    ) -> Result<ArticleArtifact, ArticleflowError> {
        let run = RunContext::new(requester_id);
        let span = info_span!(
            "article_run",
            run_id = %run.run_id,
            requester_id = %run.requester_id
        );
        let timer = SpanTimer::start("article_run");

        info!(parent: &span, subject, "Article generation started");
        self.events.try_emit(
            names::PIPELINE_STARTED,
            Some(run.event_payload("pipeline", json!({ "subject": subject }))),
        );

        let result = self.run_stages(subject, &run).instrument(span.clone()).await;
        let duration_ms = timer.finish();

        match &result {
            Ok(artifact) => {
                info!(
                    parent: &span,
                    duration_ms,
                    seo_score = artifact.seo_analysis.overall_score,
                    html_len = artifact.article_html.len(),
                    "Article generation completed"
                );
                self.events.try_emit(
                    names::PIPELINE_COMPLETED,
                    Some(run.event_payload(
                        "pipeline",
                        json!({
                            "duration_ms": duration_ms,
                            "seo_fallback": artifact.seo_fell_back(),
                        }),
                    )),
                );
            }
            Err(err) => {
                error!(parent: &span, duration_ms, error = %err, "Article generation failed");
                self.events.try_emit(
                    names::PIPELINE_FAILED,
                    Some(run.event_payload(
                        err.stage().unwrap_or("pipeline"),
                        json!({ "duration_ms": duration_ms, "error": err.to_string() }),
                    )),
                );
            }
        }

        result
    }

    async fn run_stages(
        &self,
        subject: &str,
        run: &RunContext,
    ) -> Result<ArticleArtifact, ArticleflowError> {
        let research = self.research(subject, run).await?;
        let keywords = research.keyword_string();

        let outline = self.outline(&research.final_subject, &keywords, run).await?;
        let references = self
            .references(&research.final_subject, &outline.outline, run)
            .await?;
        let article_html = self.assemble(&research, &outline, &references, run).await?;
        let seo_analysis = self.score(&article_html, &keywords, run).await;

        Ok(ArticleArtifact::assemble(
            research,
            outline,
            references,
            article_html,
            seo_analysis,
            run.requester_id.clone(),
            run.run_id,
        ))
    }

    /// Stage 1: refines the subject and researches keywords.
    pub async fn research(
        &self,
        subject: &str,
        run: &RunContext,
    ) -> Result<ResearchResult, ArticleflowError> {
        let prompt = prompts::research_prompt(subject, &self.content);
        self.structured_stage(prompt, run).await
    }

    /// Stage 2: proposes the outline, unique angle, and meta tags.
    pub async fn outline(
        &self,
        final_subject: &str,
        keywords: &str,
        run: &RunContext,
    ) -> Result<OutlineResult, ArticleflowError> {
        let prompt = prompts::outline_prompt(final_subject, keywords, &self.content);
        self.structured_stage(prompt, run).await
    }

    /// Stage 3: gathers expert concepts, statistic themes, and sources.
    pub async fn references(
        &self,
        final_subject: &str,
        outline: &[OutlineSection],
        run: &RunContext,
    ) -> Result<ReferencesResult, ArticleflowError> {
        let prompt = prompts::references_prompt(final_subject, outline, &self.content);
        self.structured_stage(prompt, run).await
    }

    /// Stage 4: renders the article and returns its body fragment.
    pub async fn assemble(
        &self,
        research: &ResearchResult,
        outline: &OutlineResult,
        references: &ReferencesResult,
        run: &RunContext,
    ) -> Result<String, ArticleflowError> {
        let stage = StageTag::Assembly.label();
        let prompt = prompts::assembly_prompt(research, outline, references, &self.content);

        self.tracked(stage, run, async {
            let raw = self.call_model(&prompt, stage).await?;
            let html = clean_html_response(&raw);
            if html.is_empty() {
                return Err(ArticleflowError::EmptyPayload {
                    stage: stage.to_string(),
                });
            }
            info!(stage, html_len = html.len(), "HTML article generated");
            Ok(html)
        })
        .await
    }

    /// Stage 5: scores the article. Never fails; falls back to a fixed report.
    pub async fn score(&self, article_html: &str, keywords: &str, run: &RunContext) -> SeoReport {
        let stage = StageTag::Scoring.label();
        let prompt = prompts::scoring_prompt(article_html, keywords);

        match self.structured_stage::<SeoReport>(prompt, run).await {
            Ok(report) => {
                info!(stage, seo_score = report.overall_score, "SEO analysis completed");
                report
            }
            Err(err) => {
                warn!(stage, error = %err, "SEO report generation failed, using fallback");
                self.events.try_emit(
                    names::STAGE_FALLBACK,
                    Some(run.event_payload(stage, json!({ "error": err.to_string() }))),
                );
                SeoReport::fallback()
            }
        }
    }

    /// Summarizes an existing article. Returns the model's text as-is.
    pub async fn summarize_article(
        &self,
        article_content: &str,
        requester_id: &str,
    ) -> Result<String, ArticleflowError> {
        let run = RunContext::new(requester_id);
        let prompt = prompts::summary_prompt(article_content, &self.content);

        self.tracked(SUMMARIZE_LABEL, &run, self.call_model(&prompt, SUMMARIZE_LABEL))
            .instrument(info_span!("summarize", requester_id = %run.requester_id))
            .await
    }

    /// Expands one section of an existing article into an HTML fragment.
    pub async fn expand_section(
        &self,
        article_content: &str,
        section_title: &str,
        requester_id: &str,
    ) -> Result<String, ArticleflowError> {
        let run = RunContext::new(requester_id);
        let prompt = prompts::expansion_prompt(article_content, section_title, &self.content);

        self.tracked(EXPAND_LABEL, &run, async {
            let raw = self.call_model(&prompt, EXPAND_LABEL).await?;
            Ok::<_, ArticleflowError>(strip_html_fences(&raw))
        })
        .instrument(info_span!(
            "expand",
            requester_id = %run.requester_id,
            section_title
        ))
        .await
    }

    async fn structured_stage<T: StageSchema>(
        &self,
        prompt: String,
        run: &RunContext,
    ) -> Result<T, ArticleflowError> {
        let stage = T::STAGE.label();
        self.tracked(stage, run, async {
            let text = self.call_model(&prompt, stage).await?;
            let value = parse_structured(&text, stage)?;
            validate::<T>(value)
        })
        .await
    }

    async fn call_model(&self, prompt: &str, stage: &str) -> Result<String, ArticleflowError> {
        let outcome = self
            .retry
            .run(stage, self.client.model(), || self.client.complete(prompt, stage))
            .await?;

        if outcome.retries() > 0 {
            info!(stage, retries = outcome.retries(), "Model call succeeded after retries");
        }
        Ok(outcome.value)
    }

    /// Brackets `work` with started/completed/failed log lines and events.
    async fn tracked<T, Fut>(
        &self,
        stage: &str,
        run: &RunContext,
        work: Fut,
    ) -> Result<T, ArticleflowError>
    where
        Fut: Future<Output = Result<T, ArticleflowError>>,
    {
        let timer = SpanTimer::start(stage);
        info!(stage, requester_id = %run.requester_id, "Stage started");
        self.events
            .try_emit(names::STAGE_STARTED, Some(run.event_payload(stage, json!({}))));

        let result = work.await;
        let duration_ms = timer.finish();

        match &result {
            Ok(_) => {
                info!(stage, requester_id = %run.requester_id, duration_ms, "Stage completed");
                self.events.try_emit(
                    names::STAGE_COMPLETED,
                    Some(run.event_payload(stage, json!({ "duration_ms": duration_ms }))),
                );
            }
            Err(err) => {
                warn!(
                    stage,
                    requester_id = %run.requester_id,
                    duration_ms,
                    error = %err,
                    "Stage failed"
                );
                self.events.try_emit(
                    names::STAGE_FAILED,
                    Some(run.event_payload(
                        stage,
                        json!({ "duration_ms": duration_ms, "error": err.to_string() }),
                    )),
                );
            }
        }

        result
    }
}
