pub const BLAME_TEXT: &str = include_str!("../data/prompts/blame_text.txt");
pub const BLAME_IMAGE: &str = include_str!("../data/prompts/blame_image.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
