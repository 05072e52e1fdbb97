/// Instruction wrapper sent with every edit request, with or without an image.
pub const EDIT_INSTRUCTION: &str = "Please edit the following image. {{prompt}}";

/// Context-free prompt used for the single fallback attempt.
pub const FALLBACK_INSTRUCTION: &str =
    "Generate an image: {{prompt}}. Please create and return an actual image.";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn edit_instruction(prompt: &str) -> String {
    render(EDIT_INSTRUCTION, &[("prompt", prompt)])
}

pub fn fallback_instruction(prompt: &str) -> String {
    render(FALLBACK_INSTRUCTION, &[("prompt", prompt)])
}
