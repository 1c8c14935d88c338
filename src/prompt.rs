use crate::article::Article;

pub const SYSTEM_PROMPT: &str =
    "You are a scientific article analysis expert. Always respond with valid JSON only.";

const INTRO: &str = "You are an expert scientific article analyzer. Analyze the following research article and provide a structured analysis in JSON format.\n\nArticle to analyze:\n";

const SCHEMA: &str = r#"Provide your analysis in the following JSON structure (respond ONLY with valid JSON, no markdown formatting):

{
  "main_topic": "Brief description of the main research topic",
  "methodology": "Research methodology used (or null if not applicable)",
  "key_findings": ["Finding 1", "Finding 2", "Finding 3"],
  "techniques": ["Technique 1", "Technique 2"],
  "category": {
    "domain": "Main domain (e.g., Computer Science, Physics, Mathematics, Biology, etc.)",
    "subcategory": "Specific subcategory (e.g., Machine Learning, Natural Language Processing, Computer Vision, Quantum Physics, etc.)",
    "complexity": "Beginner, Intermediate, or Advanced",
    "article_type": "Theory, Application, Survey, or Tutorial"
  },
  "summary": {
    "brief": "A 2-3 sentence summary of the article",
    "key_points": ["Key point 1", "Key point 2", "Key point 3"]
  },
  "confidence": 0.85
}

Respond with ONLY the JSON object, no additional text or formatting."#;

/// Renders the user instruction for one article.
pub fn build_prompt(article: &Article) -> String {
    let excerpt = article.full_text_excerpt();
    let mut result = String::with_capacity(
        INTRO.len()
            + SCHEMA.len()
            + article.title.len()
            + article.abstract_text.len()
            + excerpt.map_or(0, str::len)
            + 128,
    );

    result.push_str(INTRO);
    result.push_str("\nTitle: ");
    result.push_str(&article.title);
    result.push_str("\n\nAbstract: ");
    result.push_str(&article.abstract_text);
    result.push_str("\n\nCategories: ");
    result.push_str(&article.categories.join(", "));
    result.push('\n');

    if let Some(text) = excerpt {
        result.push_str("\n\nFull Text (excerpt):\n");
        result.push_str(text);
    }

    result.push_str("\n\n");
    result.push_str(SCHEMA);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::FULL_TEXT_CHAR_LIMIT;

    fn article() -> Article {
        Article::new("2401.00001", "Sparse Transformers", "We study sparsity.")
            .with_categories(["cs.LG", "stat.ML"])
    }

    #[test]
    fn renders_article_fields() {
        let prompt = build_prompt(&article());
        assert!(prompt.contains("Title: Sparse Transformers"));
        assert!(prompt.contains("Abstract: We study sparsity."));
        assert!(prompt.contains("Categories: cs.LG, stat.ML"));
        assert!(!prompt.contains("Full Text (excerpt)"));
    }

    #[test]
    fn describes_schema_and_enumerations() {
        let prompt = build_prompt(&article());
        for field in ["main_topic", "key_findings", "techniques", "article_type", "key_points"] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("Beginner, Intermediate, or Advanced"));
        assert!(prompt.contains("Theory, Application, Survey, or Tutorial"));
        assert!(prompt.ends_with("no additional text or formatting."));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(build_prompt(&article()), build_prompt(&article()));
    }

    #[test]
    fn full_text_beyond_limit_is_not_sent() {
        let body = format!("{}{}", "a".repeat(FULL_TEXT_CHAR_LIMIT), "OVERFLOW");
        let prompt = build_prompt(&article().with_full_text(body));

        assert!(prompt.contains("Full Text (excerpt):"));
        assert!(prompt.contains(&"a".repeat(FULL_TEXT_CHAR_LIMIT)));
        assert!(!prompt.contains("OVERFLOW"));
    }
}
