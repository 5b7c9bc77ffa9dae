//! Prompt construction and response cleanup.

/// Prompt asking the model to describe an assembly from its part names.
pub fn name_prompt(file_name: &str, part_names: &[String]) -> String {
    let mut prompt = format!(
        "Based on the following list of product names from a STEP file named '{file_name}', generate a JSON metadata that includes:\n"
    );
    prompt += "If none of the component names make sense, or too generic, ignore everything and return an empty JSON object.\n";
    prompt += "1. A brief description of what this assembly might be (json key description)\n";
    prompt += "2. Potential categories or tags for the assembly (json key categories)\n";
    prompt += "3. Estimated complexity (low, medium, high) (json key complexity)\n";
    prompt += "4. Possible industry or application (json key industry)\n";
    prompt += "5. Simplified names of components, for example if 'shaft_holder001' is a component, the name should be 'shaft_holder' or if it does not make sense do not include it (json key components)\n";
    prompt += &format!("Product names: {}", part_names.join(", "));
    prompt += "\nProvide the response as a JSON object.";
    prompt
}

/// Prompt asking the model to describe an assembly from rendered views,
/// used when the part names were uninformative.
pub fn image_prompt(file_name: &str) -> String {
    let mut prompt = format!(
        "The attached images are rendered views of parts from a STEP file named '{file_name}'. Generate a JSON metadata that includes:\n"
    );
    prompt += "If the shapes are unrecognizable, ignore everything and return an empty JSON object.\n";
    prompt += "1. A brief description of what this assembly might be (json key description)\n";
    prompt += "2. Potential categories or tags for the assembly (json key categories)\n";
    prompt += "3. Estimated complexity (low, medium, high) (json key complexity)\n";
    prompt += "4. Possible industry or application (json key industry)\n";
    prompt += "5. Names of recognizable components (json key components)\n";
    prompt += "Provide the response as a JSON object.";
    prompt
}

/// Pull the JSON object out of a model reply, stripping Markdown code
/// fences when present.
pub fn extract_json(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}
