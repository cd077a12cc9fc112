// Prompts for the single-shot statement extraction.

use crate::error::Result;
use crate::schema::ExtractionPayload;

pub const SYSTEM_PROMPT_EXTRACTION: &str = r#"
You are an expert financial analyst extracting structured data from an annual financial report.
The report text was converted from PDF or XML and may contain markdown tables, broken columns and page headers.

## YOUR MISSION
Return a SINGLE JSON object describing the company and EVERY reporting period found in the text
(annual reports usually show the current year and at least one comparative year).

## TARGET SCHEMA
The JSON object MUST validate against this schema:

```json
{schema}
```

## CRITICAL RULES

### 1. Field Names
- Use the EXACT keys from the schema. Do not rename, translate or add keys.
- Every period needs `period_end_date` in YYYY-MM-DD format.
- If a value is genuinely not disclosed, use null. Never invent numbers.

### 2. Signs
- Preserve the sign shown in the report. A loss is NEGATIVE (`ebit`, `net_income`, `ocf`).
- Revenue, total assets and total liabilities are never negative.

### 3. Accounting Check (verify BEFORE responding)
- `assets` MUST EQUAL `liabilities` + `equity` (small rounding differences are acceptable).
- If they do not match, you extracted the wrong lines. Fix them before answering.

### 4. Liabilities vs. "Liabilities and Equity"
- Balance sheets end with a grand total labelled "Total liabilities and equity"
  (Polish: "Pasywa razem"). That line equals total ASSETS. It is NOT `liabilities`.
- `liabilities` is the sum of current and non-current liabilities ONLY
  (Polish: "Zobowiązania"). `equity` is total equity (Polish: "Kapitał własny").

### 5. Units
- Report figures exactly in the unit the statements use and state that unit in `reporting_unit`
  ("units", "thousands" or "millions").
- `shares_outstanding` is the weighted average number of shares in UNITS.
  If the report states shares "in thousands", multiply by 1,000.
- `total_debt` is interest-bearing debt only: loans, bonds and leases. Exclude trade payables.

## OUTPUT FORMAT
Return ONLY the JSON object. No commentary, no markdown fences.
"#;

/// The system instruction with the extraction schema embedded.
pub fn build_system_prompt() -> Result<String> {
    let schema = ExtractionPayload::schema_as_json()?;
    Ok(SYSTEM_PROMPT_EXTRACTION.replace("{schema}", &schema))
}

pub fn build_user_message(document_text: &str) -> String {
    format!(
        "Extract data from this report:\n\n{}",
        document_text
    )
}
