use ledgerchat_core::Column;
use std::sync::OnceLock;

/// Marker that opens the filter line of a model reply.
pub const FILTER_MARKER: &str = "Filtro:";

/// Marker that opens the summary line of a model reply.
pub const SUMMARY_MARKER: &str = "Resumen:";

/// The fixed system instruction sent with every question.
///
/// Built once per process; the text never depends on the request.
pub fn system_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(build_system_prompt)
}

fn build_system_prompt() -> String {
    let columns = Column::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::with_capacity(1024);
    out.push_str(
        "Sos un asistente que responde preguntas sobre los gastos del municipio de \
         Bahía Blanca (2008–2023).\n",
    );
    out.push_str("Tenés acceso a una tabla con las siguientes columnas: ");
    out.push_str(&columns);
    out.push_str(".\n\n");

    out.push_str("Si el usuario hace una pregunta concreta, respondé en este formato:\n\n");
    out.push_str(FILTER_MARKER);
    out.push_str(" [condición sobre las columnas, por ejemplo: año == 2022 and dependencia == \"Salud\"]\n");
    out.push_str(SUMMARY_MARKER);
    out.push_str(" [explicación que acompañe la respuesta]\n\n");

    out.push_str("Reglas para la condición:\n");
    out.push_str("- Operadores: ==, !=, >, >=, <, <=, and, or, not, paréntesis.\n");
    out.push_str("- Textos entre comillas: dependencia == \"Salud\".\n");
    out.push_str("- Listas: proveedor in [\"A\", \"B\"].\n");
    out.push_str("- Columnas con espacios entre acentos graves: `orden de compra` == \"4512\".\n");
    out.push_str("- año e importe son numéricos; no los compares con textos.\n\n");

    out.push_str("Si la pregunta no requiere datos de la tabla, respondé sin la línea ");
    out.push_str(FILTER_MARKER);
    out.push_str("\n\nNO inventes datos. Solo indicá cómo filtrar.\n");
    out
}
