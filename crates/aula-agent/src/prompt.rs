//! Prompt composition.

use crate::error::AgentError;
use aula_types::{Animation, Directory, FacialExpression, MAX_MESSAGES};

/// A system instruction plus a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the prompt for one chat turn.
///
/// `knowledge_snippet` is inserted as given; callers truncate it to their
/// budget. `context` is the resolver's directory summary: when empty the
/// user turn is the question verbatim.
pub fn build_prompt(
    directory: &Directory,
    knowledge_snippet: &str,
    query: &str,
    context: &str,
) -> Result<ChatPrompt, AgentError> {
    let directory_json = serde_json::to_string(directory).map_err(AgentError::Encode)?;

    let expressions = FacialExpression::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let animations = Animation::ALL
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "You are a virtual university assistant.\n\
         Usa esta base de conocimiento de archivos .md para responder: {knowledge_snippet}... (resumido).\n\
         Usa este directorio universitario para información específica: {directory_json}.\n\
         Si la consulta menciona códigos o entidades del directorio, úsalos para responder.\n\
         Para administrativos, incluye los enlaces a los formatos descargables.\n\
         Para aspirantes sin código, responde preguntas generales sobre la universidad o sus carreras \
         usando la base de conocimiento (currículos, costos, perfiles).\n\
         Responde siempre con un objeto JSON con la clave \"messages\": un array de máximo {MAX_MESSAGES} mensajes. \
         Cada mensaje tiene text, facialExpression y animation.\n\
         Facial expressions: {expressions}.\n\
         Animations: {animations}.\n\
         Integra la información de la base de conocimiento y del directorio en el texto de forma natural."
    );

    let user = if context.is_empty() {
        query.to_string()
    } else {
        format!("{query}. DB info relevante: {context}")
    };

    Ok(ChatPrompt { system, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_types::{ScheduleEntry, StudentRecord};

    fn directory() -> Directory {
        let mut directory = Directory::default();
        directory.students.insert(
            "EST001".to_string(),
            StudentRecord {
                name: "Juan Perez".to_string(),
                code: "EST001".to_string(),
                career: "Ingeniería de Sistemas".to_string(),
                semester: 5,
                grades: Default::default(),
                schedule: vec![],
            },
        );
        directory.schedules.insert(
            "general".to_string(),
            vec![ScheduleEntry {
                day: "Lunes".to_string(),
                classes: vec!["Matemáticas 8am".to_string()],
            }],
        );
        directory
    }

    #[test]
    fn system_prompt_embeds_knowledge_and_directory() {
        let prompt = build_prompt(&directory(), "## Carreras", "hola", "").unwrap();

        assert!(prompt.system.contains("## Carreras... (resumido)"));
        assert!(prompt.system.contains("\"EST001\":{\"name\":\"Juan Perez\""));
        assert!(prompt.system.contains("\"messages\""));
        assert!(prompt.system.contains("máximo 3 mensajes"));
        assert!(prompt
            .system
            .contains("smile, sad, angry, surprised, funnyFace, default"));
        assert!(prompt.system.contains(
            "Talking_0, Talking_1, Talking_2, Crying, Laughing, Rumba, Idle, Terrified, Angry"
        ));
    }

    #[test]
    fn empty_context_leaves_question_unmodified() {
        let prompt = build_prompt(&directory(), "", "¿Qué carreras hay?", "").unwrap();
        assert_eq!(prompt.user, "¿Qué carreras hay?");
    }

    #[test]
    fn context_is_appended_to_question() {
        let prompt = build_prompt(
            &directory(),
            "",
            "estudiante EST404",
            "Estudiante no encontrado.",
        )
        .unwrap();
        assert_eq!(
            prompt.user,
            "estudiante EST404. DB info relevante: Estudiante no encontrado."
        );
    }
}
