//! End-to-end tests for the article pipeline over a scripted provider.

#[cfg(test)]
mod tests {
    use crate::completion::CompletionClient;
    use crate::config::{GenerationConfig, RetryConfig};
    use crate::errors::{ArticleflowError, CompletionError, UpstreamErrorKind};
    use crate::events::{names, CollectingEventSink};
    use crate::pipeline::{ArticlePipeline, RunContext};
    use crate::stages::{FALLBACK_SCORE, FALLBACK_STATUS};
    use crate::testing::{fixtures, ScriptedProvider};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn fast_retry() -> RetryConfig {
        RetryConfig::new()
            .with_base_delay_ms(1)
            .with_max_delay_ms(2)
    }

    fn pipeline_with(provider: &Arc<ScriptedProvider>) -> (ArticlePipeline, Arc<CollectingEventSink>) {
        let client = CompletionClient::with_provider(GenerationConfig::default(), provider.clone());
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline =
            ArticlePipeline::new(Arc::new(client), fast_retry()).with_event_sink(sink.clone());
        (pipeline, sink)
    }

    #[tokio::test]
    async fn test_full_run_assembles_artifact() {
        let provider = Arc::new(ScriptedProvider::with_responses(fixtures::article_run()));
        let (pipeline, _) = pipeline_with(&provider);

        let artifact = pipeline
            .generate_article("anxiety at work", "user-7")
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 5);
        assert_eq!(provider.remaining(), 0);
        assert!(artifact.article_html.starts_with("<h1>Managing anxiety at work</h1>"));
        assert!(!artifact.article_html.contains("DOCTYPE"));
        assert!(!artifact.article_html.contains("```"));
        assert_eq!(artifact.final_subject, "Managing anxiety at work");
        assert_eq!(
            artifact.keywords,
            "workplace anxiety, work stress, burnout, anxiety symptoms, \
             how to calm anxiety at work, anxiety before meetings"
        );
        assert_eq!(artifact.seo_analysis.overall_score, 86);
        assert!(!artifact.seo_fell_back());
        assert_eq!(artifact.metadata.requester_id, "user-7");
        assert_eq!(
            artifact.metadata.proposed_title,
            "Workplace Anxiety: Practical Ways to Cope"
        );
    }

    #[tokio::test]
    async fn test_stage_results_flow_into_later_prompts() {
        let provider = Arc::new(ScriptedProvider::with_responses(fixtures::article_run()));
        let (pipeline, _) = pipeline_with(&provider);

        pipeline.generate_article("anxiety at work", "u").await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 5);
        assert!(prompts[0].contains("anxiety at work"));
        assert!(prompts[1].contains("Managing anxiety at work"));
        assert!(prompts[1].contains("workplace anxiety, work stress"));
        assert!(prompts[2].contains("Practical strategies"));
        assert!(prompts[3].contains("Viktor Frankl"));
        assert!(prompts[3].contains("Workplace Anxiety: Practical Ways to Cope"));
        assert!(prompts[4].contains("<h1>Managing anxiety at work</h1>"));
    }

    #[tokio::test]
    async fn test_run_emits_stage_events_in_order() {
        let provider = Arc::new(ScriptedProvider::with_responses(fixtures::article_run()));
        let (pipeline, sink) = pipeline_with(&provider);

        pipeline.generate_article("anxiety at work", "u").await.unwrap();

        let types = sink.event_types();
        assert_eq!(types.first().map(String::as_str), Some(names::PIPELINE_STARTED));
        assert_eq!(types.last().map(String::as_str), Some(names::PIPELINE_COMPLETED));
        assert_eq!(sink.events_of_type(names::STAGE_STARTED).len(), 5);
        assert_eq!(sink.events_of_type(names::STAGE_COMPLETED).len(), 5);

        assert_eq!(
            sink.stages_of(names::STAGE_COMPLETED),
            vec!["Stage 1", "Stage 2", "Stage 3", "Stage 4", "Stage 5"]
        );
    }

    #[tokio::test]
    async fn test_invalid_scoring_falls_back() {
        let mut responses = fixtures::article_run();
        responses[4] = fixtures::fenced(&json!({"overall_score": 90}));
        let provider = Arc::new(ScriptedProvider::with_responses(responses));
        let (pipeline, sink) = pipeline_with(&provider);

        let artifact = pipeline.generate_article("anxiety at work", "u").await.unwrap();

        assert_eq!(artifact.seo_analysis.overall_score, FALLBACK_SCORE);
        assert_eq!(artifact.seo_analysis.seo_status, FALLBACK_STATUS);
        assert!(artifact.seo_fell_back());
        assert!(artifact.article_html.contains("Practical strategies"));
        assert_eq!(sink.events_of_type(names::STAGE_FALLBACK).len(), 1);
        assert_eq!(sink.events_of_type(names::PIPELINE_COMPLETED).len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_scoring_falls_back() {
        let mut responses = fixtures::article_run();
        responses[4] = "the article looks great".to_string();
        let provider = Arc::new(ScriptedProvider::with_responses(responses));
        let (pipeline, _) = pipeline_with(&provider);

        let artifact = pipeline.generate_article("anxiety at work", "u").await.unwrap();
        assert_eq!(artifact.seo_analysis.overall_score, FALLBACK_SCORE);
    }

    #[tokio::test]
    async fn test_outline_violation_aborts_run() {
        let mut outline = fixtures::outline_value();
        outline.as_object_mut().unwrap().remove("proposed_title");
        let provider = Arc::new(
            ScriptedProvider::new()
                .respond(fixtures::research_json())
                .respond(fixtures::fenced(&outline))
                .respond(fixtures::references_json()),
        );
        let (pipeline, sink) = pipeline_with(&provider);

        let err = pipeline
            .generate_article("anxiety at work", "u")
            .await
            .unwrap_err();

        match &err {
            ArticleflowError::SchemaViolation { stage, violations } => {
                assert_eq!(stage, "Stage 2");
                assert_eq!(violations, &vec!["\"proposed_title\" is required".to_string()]);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
        assert_eq!(provider.call_count(), 2);
        assert_eq!(sink.events_of_type(names::STAGE_FAILED).len(), 1);
        assert_eq!(sink.events_of_type(names::PIPELINE_FAILED).len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_research_aborts_run() {
        let provider = Arc::new(ScriptedProvider::with_responses(["not json at all"]));
        let (pipeline, _) = pipeline_with(&provider);

        let err = pipeline.generate_article("anxiety at work", "u").await.unwrap_err();
        assert!(matches!(err, ArticleflowError::MalformedPayload { .. }));
        assert_eq!(err.stage(), Some("Stage 1"));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let mut provider = ScriptedProvider::new()
            .fail(CompletionError::api(503, "Service Unavailable"))
            .fail(CompletionError::api(503, "Service Unavailable"));
        for response in fixtures::article_run() {
            provider = provider.respond(response);
        }
        let provider = Arc::new(provider);
        let (pipeline, sink) = pipeline_with(&provider);

        let artifact = pipeline.generate_article("anxiety at work", "u").await.unwrap();

        assert_eq!(artifact.seo_analysis.overall_score, 86);
        assert_eq!(provider.call_count(), 7);
        assert_eq!(sink.events_of_type(names::RETRY_SCHEDULED).len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_retried() {
        let provider =
            Arc::new(ScriptedProvider::new().fail(CompletionError::api(400, "API key not valid")));
        let (pipeline, _) = pipeline_with(&provider);

        let err = pipeline.generate_article("anxiety at work", "u").await.unwrap_err();

        assert_eq!(provider.call_count(), 1);
        match err {
            ArticleflowError::Upstream(upstream) => {
                assert_eq!(upstream.kind, UpstreamErrorKind::InvalidRequest);
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_assembly_output_fails() {
        let mut responses = fixtures::article_run();
        responses[3] = "```html\n\n```".to_string();
        let provider = Arc::new(ScriptedProvider::with_responses(responses));
        let (pipeline, _) = pipeline_with(&provider);

        let err = pipeline.generate_article("anxiety at work", "u").await.unwrap_err();
        assert_eq!(err.stage(), Some("Stage 4"));
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_uninitialized_client_fails() {
        let client = Arc::new(CompletionClient::new(GenerationConfig::default()));
        let pipeline = ArticlePipeline::new(client, fast_retry());

        let err = pipeline.generate_article("anxiety at work", "u").await.unwrap_err();
        assert!(matches!(err, ArticleflowError::NotInitialized));
    }

    #[tokio::test]
    async fn test_summarize_returns_raw_text() {
        let provider = Arc::new(ScriptedProvider::with_responses(["  A short summary.  "]));
        let (pipeline, _) = pipeline_with(&provider);

        let summary = pipeline
            .summarize_article("<p>Long article</p>", "u")
            .await
            .unwrap();

        assert_eq!(summary, "  A short summary.  ");
        assert!(provider.prompts()[0].contains("<p>Long article</p>"));
    }

    #[tokio::test]
    async fn test_expand_strips_fences() {
        let provider = Arc::new(ScriptedProvider::with_responses([
            "```html\n<h3>More detail</h3><p>Text.</p>\n```",
        ]));
        let (pipeline, _) = pipeline_with(&provider);

        let html = pipeline
            .expand_section("<h2>Practical strategies</h2>", "Practical strategies", "u")
            .await
            .unwrap();

        assert_eq!(html, "<h3>More detail</h3><p>Text.</p>");
        assert!(provider.prompts()[0].contains("Practical strategies"));
    }

    #[tokio::test]
    async fn test_score_runs_standalone() {
        let provider = Arc::new(ScriptedProvider::with_responses([fixtures::scoring_json()]));
        let (pipeline, _) = pipeline_with(&provider);

        let report = pipeline
            .score("<h1>Title</h1>", "anxiety", &RunContext::new("u"))
            .await;

        assert_eq!(report.overall_score, 86);
        assert!(provider.prompts()[0].contains("anxiety"));
    }
}
