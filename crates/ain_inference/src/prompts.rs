//! Prompt templates. `{title}` and `{description}` are substituted verbatim.

pub const ENHANCE_TEMPLATE: &str = "Given this AI news article title: \"{title}\" and partial description: \"{description}\", generate a comprehensive 2-3 sentence description that explains the AI development and its potential impact on society. Focus on the implications and effects of this AI technology. Make it informative and suitable for a survey about AI impact assessment.";

pub const SURVEY_TEMPLATE: &str = "Analyze this AI news article and classify it. Title: {title}. Description: {description}. Respond in JSON format with: impact ('positive' or 'negative'), category (e.g., Healthcare, Employment, Education, Privacy, Environment, Social Justice), accuracy (70-95), sources (5-20). Output only valid JSON.";

pub const DISPLAY_TEMPLATE: &str = "Analyze this AI news article. Title: {title}. Description: {description}. Respond in JSON format with: category (e.g., Healthcare, Employment, Education, Privacy, Environment, Social Justice), status ('featured', 'new', 'urgent', 'important', or 'regular'). Output only valid JSON.";

pub fn render(template: &str, title: &str, description: &str) -> String {
    template
        .replace("{title}", title)
        .replace("{description}", description)
}
