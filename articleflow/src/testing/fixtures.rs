//! Canned model responses for each stage.

use serde_json::{json, Value};

/// Wraps a JSON value in a fenced block the way models usually answer.
#[must_use]
pub fn fenced(value: &Value) -> String {
    format!("```json\n{value:#}\n```")
}

/// Stage 1 payload.
#[must_use]
pub fn research_value() -> Value {
    json!({
        "final_subject": "Managing anxiety at work",
        "primary_keyword": "workplace anxiety",
        "secondary_keywords": ["work stress", "burnout", "anxiety symptoms"],
        "long_tail_keywords": [
            "how to calm anxiety at work",
            "anxiety before meetings"
        ],
        "rationale": "Highest search intent for practical help."
    })
}

/// Stage 2 payload.
#[must_use]
pub fn outline_value() -> Value {
    json!({
        "outline": [
            {
                "heading": "What workplace anxiety looks like",
                "subheadings": ["Physical signs", "Thought patterns"]
            },
            {
                "heading": "Practical strategies",
                "subheadings": ["Breathing techniques"]
            },
            {"heading": "When to ask for help"}
        ],
        "unique_angle": "Focus on small daily routines rather than big changes.",
        "proposed_title": "Workplace Anxiety: Practical Ways to Cope",
        "proposed_description": "Learn to recognize workplace anxiety and use simple, proven strategies to stay calm and productive."
    })
}

/// Stage 3 payload.
#[must_use]
pub fn references_value() -> Value {
    json!({
        "author_insights": [
            {
                "author": "Aaron Beck",
                "concept": "Cognitive distortions",
                "quote_or_idea": "Anxious thoughts often overestimate danger."
            },
            {
                "author": "Viktor Frankl",
                "concept": "Freedom of response",
                "quote_or_idea": "Between stimulus and response there is a space."
            }
        ],
        "statistic_ideas": ["Prevalence of anxiety among employees"],
        "external_sources": ["World Health Organization"]
    })
}

/// Stage 4 raw model output.
#[must_use]
pub fn article_html() -> String {
    "```html\n<!DOCTYPE html><html lang=\"ro\"><head><title>T</title></head><body>\
     <h1>Managing anxiety at work</h1>\
     <h2 id=\"section-1\">What workplace anxiety looks like</h2><p>Body.</p>\
     <h2 id=\"section-2\">Practical strategies</h2><p>More.</p>\
     </body></html>\n```"
        .to_string()
}

/// Stage 5 payload.
#[must_use]
pub fn scoring_value() -> Value {
    json!({
        "overall_score": 86,
        "detailed_analysis": {
            "keywords": {"score": 90, "comments": "Good density."},
            "html_structure": {"score": 80, "comments": "Correct hierarchy."}
        },
        "priority_recommendations": ["Add one more internal link"],
        "seo_status": "Good"
    })
}

/// Stage 1 model response.
#[must_use]
pub fn research_json() -> String {
    fenced(&research_value())
}

/// Stage 2 model response.
#[must_use]
pub fn outline_json() -> String {
    fenced(&outline_value())
}

/// Stage 3 model response.
#[must_use]
pub fn references_json() -> String {
    fenced(&references_value())
}

/// Stage 5 model response.
#[must_use]
pub fn scoring_json() -> String {
    fenced(&scoring_value())
}

/// The five responses of a successful article run, in order.
#[must_use]
pub fn article_run() -> Vec<String> {
    vec![
        research_json(),
        outline_json(),
        references_json(),
        article_html(),
        scoring_json(),
    ]
}
