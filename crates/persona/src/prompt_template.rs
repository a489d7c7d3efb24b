use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Error as TeraError, Tera};

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    // Persona documents are plain text, not HTML
    tera.autoescape_on(vec![]);
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

pub fn load_prompt_file<T: Serialize>(
    template_file: impl AsRef<Path>,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_content = fs::read_to_string(template_file.as_ref())
        .map_err(|e| TeraError::chain("Failed to read template file", e))?;
    load_prompt(&template_content, context_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_prompt_does_not_escape() {
        let mut context = HashMap::new();
        context.insert("summary".to_string(), "R&D <lead> at \"Acme\"".to_string());
        let result = load_prompt("{{ summary }}", &context).unwrap();
        assert_eq!(result, "R&D <lead> at \"Acme\"");
    }

    #[test]
    fn test_load_prompt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test_template.md");
        fs::write(&file_path, "Hello, {{ name }}!").unwrap();

        let mut context = HashMap::new();
        context.insert("name".to_string(), "Bob".to_string());

        let result = load_prompt_file(&file_path, &context).unwrap();
        assert_eq!(result, "Hello, Bob!");
    }

    #[test]
    fn test_load_prompt_file_missing_file() {
        let file_path = PathBuf::from("non_existent_template.md");
        let context: HashMap<String, String> = HashMap::new();

        let result = load_prompt_file(file_path, &context);
        assert!(result.is_err());
    }
}
