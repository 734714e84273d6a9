//! System instruction assembly for the analysis call

use crate::context::format_workbook_context;
use crate::ingest::Workbook;

/// Build the system instruction for a question over `workbook`.
///
/// The instruction frames the model as a data analyst, embeds the context
/// snapshot, and spells out the multi-sheet join guidance, the business
/// metric definitions and the chart-directive format the reply decoder
/// expects.
pub fn build_system_instruction(workbook: &Workbook) -> String {
    let context = format_workbook_context(workbook);

    format!(
        "You are an expert Data Analyst and Excel Assistant.\n\
         You have been provided with data from a spreadsheet named \"{file_name}\" which may contain multiple sheets.\n\
         \n\
         Your goal is to answer the user's questions based on this data.\n\
         Each sheet preview below is comma-delimited with a header line; the stated Total Rows is the real size, the preview is only a sample.\n\
         \n\
         CRITICAL INSTRUCTIONS FOR MULTI-SHEET ANALYSIS:\n\
         1. Look for relationships between sheets (e.g., common ID columns, names, dates).\n\
         2. If the user asks a question that requires data from multiple sheets, mentally \"join\" the datasets based on these common columns.\n\
         3. Explicitly mention which sheets you are combining to find the answer.\n\
         \n\
         BUSINESS METRIC DEFINITIONS:\n\
         - Cost per Customer = total spend column / total customer count column, when the data pairs a spend figure with a customer count.\n\
         - Growth Rate = (current period - previous period) / previous period, expressed as a percentage.\n\
         State which columns you used whenever you compute a metric.\n\
         \n\
         GENERAL RULES:\n\
         - If the user asks in Spanish, reply in Spanish.\n\
         - If the user asks in English, reply in English.\n\
         - Format your response using Markdown. Use tables for lists of numbers.\n\
         - Be concise and professional.\n\
         \n\
         CHART DIRECTIVE:\n\
         When the question calls for a visual, append exactly one fenced block tagged `chart` containing JSON of this shape:\n\
         ```chart\n\
         {{\"type\": \"bar\", \"title\": \"...\", \"xAxisLabel\": \"...\", \"yAxisLabel\": \"...\", \"data\": [{{\"name\": \"...\", \"value\": 0}}]}}\n\
         ```\n\
         Allowed type values: bar, line, pie, area. Emit the block after your prose, and never more than one per reply.\n\
         \n\
         Data Context:\n\
         {context}",
        file_name = workbook.file_name,
        context = context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{CellScalar, Row, Sheet, Workbook};

    fn workbook() -> Workbook {
        let mut sheet = Sheet::new("Q1", vec!["Month".to_string(), "Spend".to_string()]);
        sheet.rows.push(Row::new(vec![
            ("Month".to_string(), CellScalar::Text("Jan".to_string())),
            ("Spend".to_string(), CellScalar::Number(1200.0)),
        ]));
        Workbook {
            file_name: "budget.xlsx".to_string(),
            sheets: vec![sheet],
        }
    }

    #[test]
    fn instruction_embeds_the_context_snapshot() {
        let instruction = build_system_instruction(&workbook());
        assert!(instruction.contains("budget.xlsx"));
        assert!(instruction.contains("--- SHEET 1: \"Q1\" ---"));
        assert!(instruction.contains("Month,Spend"));
    }

    #[test]
    fn instruction_describes_the_chart_directive() {
        let instruction = build_system_instruction(&workbook());
        assert!(instruction.contains("```chart"));
        assert!(instruction.contains("bar, line, pie, area"));
    }
}
