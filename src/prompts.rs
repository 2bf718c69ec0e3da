pub const SITE_INSTRUCTION: &str = include_str!("../data/prompts/site_instruction.txt");
pub const SITE_IMAGE_ATTACHED: &str = include_str!("../data/prompts/site_image_attached.txt");
pub const SITE_IMAGE_PLACEHOLDER: &str = include_str!("../data/prompts/site_image_placeholder.txt");
pub const IDEAS_INSTRUCTION: &str = include_str!("../data/prompts/ideas_instruction.txt");

/// Fill `{{name}}` placeholders; names missing from `vars` stay in place.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name), value)
    })
}

/// Full instruction for a website generation. The image paragraph switches
/// between "use the attached image" and "find a stock placeholder".
pub fn site_instruction(prompt: &str, has_image: bool) -> String {
    let image_instruction = if has_image {
        SITE_IMAGE_ATTACHED
    } else {
        SITE_IMAGE_PLACEHOLDER
    };

    render(
        SITE_INSTRUCTION,
        &[
            ("image_instruction", image_instruction.trim()),
            ("prompt", prompt),
        ],
    )
}

pub fn ideas_instruction(topic: &str) -> String {
    render(IDEAS_INSTRUCTION, &[("topic", topic)])
}
