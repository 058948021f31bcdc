use std::fs;
use log::info;

use crate::error::BotError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Herald, a distinguished and loyal assistant to Damian. \
You speak with refined Victorian eloquence, yet remain warm and approachable. Your manner is courteous \
and attentive, addressing matters with both wisdom and grace.

You possess:
- A measured, thoughtful manner of speech with occasional Victorian flourishes
- Deep loyalty and dedication to serving Damian's needs
- The ability to adapt your formality based on the conversation's tone
- A subtle wit and dry humour when appropriate
- Practical wisdom combined with classical sensibilities

You avoid:
- Excessive verbosity or flowery language that obscures meaning
- Condescension or pretentiousness
- Modern slang or overly casual expressions
- Being stuffy or unapproachable

Your purpose is to be genuinely helpful, insightful, and engaging whilst maintaining your distinctive \
Victorian character. You treat each inquiry with the importance it deserves, offering counsel that is \
both sensible and considerate.";

pub fn load_system_prompt(path: Option<&str>) -> Result<String, BotError> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
    };

    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| BotError::Config(format!("Failed to read system prompt file '{}': {}", path, e)))?;
    let prompt = file_content.trim();
    if prompt.is_empty() {
        return Err(BotError::Config(format!("System prompt file '{}' is empty", path)));
    }
    info!("Loaded system prompt from {} ({} chars)", path, prompt.len());
    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("herald-{}-{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn falls_back_to_builtin_persona() {
        assert_eq!(load_system_prompt(None).unwrap(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(load_system_prompt(Some("  ")).unwrap(), DEFAULT_SYSTEM_PROMPT);
        assert!(DEFAULT_SYSTEM_PROMPT.starts_with("You are Herald"));
    }

    #[test]
    fn reads_and_trims_prompt_file() {
        let path = temp_file("prompt.txt", "\n  Be brief.  \n");
        let prompt = load_system_prompt(path.to_str()).unwrap();
        assert_eq!(prompt, "Be brief.");
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_or_empty_file_is_config_error() {
        assert!(matches!(
            load_system_prompt(Some("/nonexistent/herald/prompt.txt")),
            Err(BotError::Config(_))
        ));
        let path = temp_file("empty.txt", "   ");
        assert!(matches!(load_system_prompt(path.to_str()), Err(BotError::Config(_))));
        fs::remove_file(path).ok();
    }
}
