//! Prompt builders for every model call.
//!
//! Builders are pure: each takes only the validated results it depends on
//! and returns the prompt text.

use crate::config::ContentConfig;
use crate::parser::preview;
use crate::stages::{OutlineResult, OutlineSection, ReferencesResult, ResearchResult};

/// Characters of the assembled article embedded in the scoring prompt.
pub const SCORING_HTML_LIMIT: usize = 8000;

/// Characters of an existing article embedded in summarize and expand prompts.
pub const SOURCE_ARTICLE_LIMIT: usize = 10_000;

const ARTICLE_STYLE: &str = "\
body { font-family: 'Arial', sans-serif; line-height: 1.7; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; }
h1, h2, h3 { font-weight: bold; color: #2c3e50; margin-top: 2em; margin-bottom: 0.8em; line-height: 1.2; }
h1 { font-size: 2.2em; text-align: center; }
h2 { font-size: 1.8em; color: #3498db; }
h3 { font-size: 1.4em; }
p { margin-bottom: 1em; text-align: justify; }
ul, ol { margin-bottom: 1em; padding-left: 25px; }
blockquote { border-left: 4px solid #ccc; padding-left: 15px; margin: 1.5em 0; font-style: italic; color: #555; }
a { color: #3498db; text-decoration: none; }
.table-of-contents { background-color: #f9f9f9; padding: 15px; border-radius: 8px; border: 1px solid #eee; margin-bottom: 30px; }
.highlight-box { background-color: #e6f7ff; border-left: 4px solid #3498db; padding: 15px; margin: 20px 0; border-radius: 4px; }
.cta-block { background-color: #d4edda; color: #155724; padding: 25px; text-align: center; border-radius: 8px; margin-top: 40px; }
.cta-block a { background-color: #28a745; color: white; padding: 12px 25px; border-radius: 5px; display: inline-block; font-weight: bold; }
@media (max-width: 768px) { body { padding: 10px; } h1 { font-size: 1.8em; } h2 { font-size: 1.5em; } }";

const STANDARD_RESOURCES: [(&str, &str); 3] = [
    (
        "https://www.who.int/health-topics/mental-health",
        "World Health Organization: mental health",
    ),
    ("https://scholar.google.com/", "Google Scholar"),
    ("https://pubmed.ncbi.nlm.nih.gov/", "PubMed"),
];

/// Stage 1: subject refinement and keyword research.
#[must_use]
pub fn research_prompt(subject: &str, content: &ContentConfig) -> String {
    format!(
        "You are an SEO expert and psychotherapist. Generate 3 detailed topic ideas for a blog \
article based directly and specifically on \"{subject}\" (do NOT change the main subject, \
only refine it), optimized for search. For each idea propose:
- One relevant primary keyword with decent search volume.
- 5-7 secondary/LSI keywords (variations, synonyms, semantically related terms).
- 10 long-tail keywords matching informational, commercial, or navigational intent.
Pick the best subject and keyword set, justify the choice, and write every value in {language}.
Return strict JSON only, with no text outside the JSON block:
{{\"final_subject\": \"...\", \"primary_keyword\": \"...\", \"secondary_keywords\": [\"...\"], \
\"long_tail_keywords\": [\"...\"], \"rationale\": \"...\"}}",
        language = content.language,
    )
}

/// Stage 2: competitive outline and meta proposal.
#[must_use]
pub fn outline_prompt(final_subject: &str, keywords: &str, content: &ContentConfig) -> String {
    format!(
        "Based on the subject \"{final_subject}\" and the relevant keywords \"{keywords}\", \
simulate a Google competitor analysis. Identify 3-5 essential sub-topics or frequent questions \
competitors cover (or cover poorly) and propose a unique angle or content gap our article can \
exploit. Structure the article into logical sections (H2) and sub-sections (H3) for roughly \
1200 words.
Propose a concise meta title (50-60 characters) that includes the primary keyword.
Propose a meta description (150-160 characters) summarizing the page.
Write every value in {language}. Return strict JSON:
{{\"outline\": [{{\"heading\": \"...\", \"subheadings\": [\"...\"]}}], \"unique_angle\": \"...\", \
\"proposed_title\": \"...\", \"proposed_description\": \"...\"}}
Make sure the JSON is complete and valid, with no truncation or formatting errors.",
        language = content.language,
    )
}

fn render_outline(outline: &[OutlineSection]) -> String {
    let mut out = String::new();
    for (i, section) in outline.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, section.heading));
        for sub in &section.subheadings {
            out.push_str(&format!("   - {sub}\n"));
        }
    }
    out
}

/// Stage 3: expert concepts, statistic themes, and sources.
#[must_use]
pub fn references_prompt(
    final_subject: &str,
    outline: &[OutlineSection],
    content: &ContentConfig,
) -> String {
    format!(
        "For the article on \"{final_subject}\" with the structure:\n{structure}\
Identify 3-5 key concepts from renowned psychotherapy authors (e.g. Sigmund Freud, Carl Jung, \
Carl Rogers, Aaron Beck, Irvin Yalom, Viktor Frankl) relevant to the sub-topics. For each \
concept propose a short representative quote or main idea that can be woven into the article. \
Also include 2-3 relevant statistic themes (no exact figures, only the topic) and 2-3 \
authoritative external sources (an institution or publication name). Write every value in \
{language}. Return strict JSON:
{{\"author_insights\": [{{\"author\": \"...\", \"concept\": \"...\", \"quote_or_idea\": \"...\"}}], \
\"statistic_ideas\": [\"...\"], \"external_sources\": [\"...\"]}}",
        structure = render_outline(outline),
        language = content.language,
    )
}

fn table_of_contents(outline: &[OutlineSection]) -> String {
    let mut out = String::from(
        "<div class=\"table-of-contents\">\n<h2>Contents</h2>\n<ul style=\"list-style-type: none; padding: 0;\">\n",
    );
    for (i, section) in outline.iter().enumerate() {
        let id = format!("section-{}", i + 1);
        out.push_str(&format!("<li><a href=\"#{id}\">{}</a>", section.heading));
        if !section.subheadings.is_empty() {
            out.push_str("<ul style=\"list-style-type: none; padding-left: 20px;\">");
            for (j, sub) in section.subheadings.iter().enumerate() {
                out.push_str(&format!("<li><a href=\"#{id}-{}\">{sub}</a></li>", j + 1));
            }
            out.push_str("</ul>");
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n</div>\n");
    out
}

fn section_bodies(outline: &[OutlineSection], research: &ResearchResult) -> String {
    let secondary = research.secondary_keywords.join(", ");
    let mut out = String::new();
    for (i, section) in outline.iter().enumerate() {
        let id = format!("section-{}", i + 1);
        out.push_str(&format!("<h2 id=\"{id}\">{}</h2>\n", section.heading));
        out.push_str(&format!(
            "<p>Develop this section in 1-3 concise, essential paragraphs with practical, \
scientifically grounded information. Work in the relevant secondary keywords: {secondary}. \
Include a bulleted or numbered list where it helps.</p>\n"
        ));
        for (j, sub) in section.subheadings.iter().enumerate() {
            out.push_str(&format!("<h3 id=\"{id}-{}\">{sub}</h3>\n", j + 1));
            out.push_str(&format!(
                "<p>Develop this sub-section in 1-2 clear paragraphs with specific details and \
practical examples for \"{sub}\". Work in long-tail keywords naturally.</p>\n"
            ));
            if j == 0 {
                out.push_str(
                    "<div class=\"highlight-box\"><p><strong>💡 Tip:</strong> Add a practical, \
actionable recommendation tied directly to this sub-topic.</p></div>\n",
                );
            }
        }
    }
    out
}

fn expert_section(final_subject: &str, references: &ReferencesResult) -> String {
    let mut out = String::from("<h2>Perspectives from Psychotherapy: What Experts Say</h2>\n");
    out.push_str(&format!(
        "<p>Psychotherapy offers the scientific foundation for understanding {final_subject}. \
Here is what researchers teach us:</p>\n"
    ));
    for insight in &references.author_insights {
        out.push_str(&format!(
            "<blockquote><p><strong>{}</strong> ({}): \"{}\"</p></blockquote>\n",
            insight.author, insight.concept, insight.quote_or_idea
        ));
    }
    if !references.statistic_ideas.is_empty() {
        out.push_str(&format!(
            "<p>Write one paragraph on why these statistic themes matter, without inventing \
exact figures: {}.</p>\n",
            references.statistic_ideas.join("; ")
        ));
    }
    out
}

fn resources_section(references: &ReferencesResult) -> String {
    let mut out = String::from("<h2>Further Resources</h2>\n<ul>\n");
    for (href, label) in STANDARD_RESOURCES {
        out.push_str(&format!("<li><a href=\"{href}\" rel=\"nofollow\">{label}</a></li>\n"));
    }
    for source in &references.external_sources {
        out.push_str(&format!("<li>{source}</li>\n"));
    }
    out.push_str("</ul>\n");
    out
}

/// Stage 4: full HTML article from every earlier result.
#[must_use]
pub fn assembly_prompt(
    research: &ResearchResult,
    outline: &OutlineResult,
    references: &ReferencesResult,
    content: &ContentConfig,
) -> String {
    let subject = &research.final_subject;
    let mut skeleton = format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
<title>{title}</title>\n<meta name=\"description\" content=\"{description}\">\n\
<style>\n{ARTICLE_STYLE}\n</style>\n</head>\n<body>\n",
        lang = content.html_lang,
        title = outline.proposed_title,
        description = outline.proposed_description,
    );
    skeleton.push_str(&table_of_contents(&outline.outline));
    skeleton.push_str(&format!("<h1>{subject}</h1>\n"));
    skeleton.push_str(&format!(
        "<p><strong>Introduction:</strong> Write a captivating 2-3 paragraph introduction \
explaining what \"{subject}\" is, why it matters to the reader, and what they will learn. \
Work the primary keyword \"{}\" in naturally. Use a warm, empathetic, professional tone.</p>\n",
        research.primary_keyword
    ));
    skeleton.push_str(&section_bodies(&outline.outline, research));
    skeleton.push_str(&expert_section(subject, references));
    skeleton.push_str(&resources_section(references));
    skeleton.push_str(&format!(
        "<h2>Conclusion</h2>\n<p>Summarize the main benefits of managing {subject} and \
encourage the reader to take concrete steps. Close with a strong, positive message.</p>\n"
    ));
    skeleton.push_str(&format!(
        "<div class=\"cta-block\">\n<h2>Ready to take the first step?</h2>\n\
<p>If this article resonated with you and you need specialized support, you are not alone.</p>\n\
<a href=\"{}\">Book a session now!</a>\n</div>\n</body>\n</html>",
        content.contact_url
    ));

    format!(
        "You are an SEO content expert and psychotherapist. Write a complete blog article of \
about 1200-1500 words in {language} on \"{subject}\". The unique angle is: {angle}.
THE OUTPUT MUST BE ONLY VALID, CLEAN HTML READY TO PASTE INTO A WEBSITE, WITH NO TEXT OR \
MARKDOWN OUTSIDE THE HTML. Follow this skeleton, replacing every instruction paragraph with \
the finished prose and keeping the ids, classes, and links:

{skeleton}",
        language = content.language,
        angle = outline.unique_angle,
    )
}

/// Stage 5: SEO and UX evaluation of the assembled article.
#[must_use]
pub fn scoring_prompt(article_html: &str, keywords: &str) -> String {
    format!(
        "Evaluate the following HTML article for SEO and UX quality.

EVALUATION CRITERIA:
1. Keywords: density and distribution for \"{keywords}\"
2. HTML structure: H1 > H2 > H3 hierarchy and semantics
3. Content quality: originality, value, coherence
4. Metadata: title and meta description
5. UX: readability, structure, calls to action

Return ONLY strict JSON:
{{
  \"overall_score\": 85,
  \"detailed_analysis\": {{
    \"keywords\": {{\"score\": 90, \"comments\": \"...\"}},
    \"html_structure\": {{\"score\": 80, \"comments\": \"...\"}},
    \"content_quality\": {{\"score\": 85, \"comments\": \"...\"}},
    \"metadata\": {{\"score\": 75, \"comments\": \"...\"}},
    \"ux_readability\": {{\"score\": 90, \"comments\": \"...\"}}
  }},
  \"priority_recommendations\": [\"...\", \"...\", \"...\"],
  \"seo_status\": \"Good\"
}}

HTML article:
{article}...",
        article = preview(article_html, SCORING_HTML_LIMIT),
    )
}

/// Summary of an existing article.
#[must_use]
pub fn summary_prompt(article: &str, content: &ContentConfig) -> String {
    format!(
        "You are an expert at summarizing texts. Write a concise, informative summary (at most \
200 words) of the following HTML content. The summary must be in {language}, capture the main \
ideas, and contain no HTML tags.

HTML article:
{article}...",
        language = content.language,
        article = preview(article, SOURCE_ARTICLE_LIMIT),
    )
}

/// Expansion of one section of an existing article.
#[must_use]
pub fn expansion_prompt(article: &str, section_title: &str, content: &ContentConfig) -> String {
    format!(
        "You are a content expert and psychotherapist. Expand the section \"{section_title}\" of \
the following HTML article. Add at least 300 words of new, detailed content with practical \
examples and relevant information, keeping the tone and style of the original and writing in \
{language}. Return ONLY the expanded HTML for that section (no <html>, <head>, or <body> tags). \
Use paragraphs (<p>), lists (<ul><li>, <ol><li>), and bold text (<strong>) for readability.

HTML article:
{article}...",
        language = content.language,
        article = preview(article, SOURCE_ARTICLE_LIMIT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::validate;
    use crate::testing::fixtures;

    fn results() -> (ResearchResult, OutlineResult, ReferencesResult) {
        (
            validate(fixtures::research_value()).unwrap(),
            validate(fixtures::outline_value()).unwrap(),
            validate(fixtures::references_value()).unwrap(),
        )
    }

    #[test]
    fn test_research_prompt_embeds_subject_and_language() {
        let prompt = research_prompt("anxiety at work", &ContentConfig::default());
        assert!(prompt.contains("\"anxiety at work\""));
        assert!(prompt.contains("Romanian"));
        assert!(prompt.contains("\"primary_keyword\""));
    }

    #[test]
    fn test_references_prompt_lists_outline() {
        let (_, outline, _) = results();
        let prompt = references_prompt("s", &outline.outline, &ContentConfig::default());
        assert!(prompt.contains("1. What workplace anxiety looks like\n   - Physical signs"));
        assert!(prompt.contains("3. When to ask for help"));
    }

    #[test]
    fn test_assembly_prompt_skeleton() {
        let (research, outline, references) = results();
        let content = ContentConfig::default();
        let prompt = assembly_prompt(&research, &outline, &references, &content);

        assert!(prompt.contains("<html lang=\"ro\">"));
        assert!(prompt.contains("<title>Workplace Anxiety: Practical Ways to Cope</title>"));
        assert!(prompt.contains("<a href=\"#section-1-2\">Thought patterns</a>"));
        assert!(prompt.contains("<h2 id=\"section-3\">When to ask for help</h2>"));
        assert!(prompt.contains("<h3 id=\"section-2-1\">Breathing techniques</h3>"));
        assert_eq!(prompt.matches("class=\"highlight-box\"").count(), 2);
        assert!(prompt.contains("<strong>Aaron Beck</strong> (Cognitive distortions)"));
        assert!(prompt.contains("<li>World Health Organization</li>"));
        assert!(prompt.contains(&content.contact_url));
    }

    #[test]
    fn test_scoring_prompt_truncates_article() {
        let html = "é".repeat(SCORING_HTML_LIMIT + 500);
        let prompt = scoring_prompt(&html, "a, b");
        assert_eq!(prompt.matches('é').count(), SCORING_HTML_LIMIT);
        assert!(prompt.contains("\"a, b\""));
    }

    #[test]
    fn test_source_prompts_truncate_article() {
        let article = "ø".repeat(SOURCE_ARTICLE_LIMIT * 2);
        let content = ContentConfig::default();

        let summary = summary_prompt(&article, &content);
        assert_eq!(summary.matches('ø').count(), SOURCE_ARTICLE_LIMIT);

        let expansion = expansion_prompt(&article, "Practical strategies", &content);
        assert!(expansion.contains("\"Practical strategies\""));
        assert_eq!(expansion.matches('ø').count(), SOURCE_ARTICLE_LIMIT);
    }
}
