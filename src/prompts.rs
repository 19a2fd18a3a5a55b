//! Prompts sent to the model.
//!
//! Every prompt lives here so the instruction text can change without
//! touching any client code. Callers can override the main template via
//! [`crate::config::XtpConfig::prompt_template`].

/// Placeholder replaced with the PDF's file name.
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

/// Default instruction prompt describing the XTP layout.
pub const XTP_PROMPT_TEMPLATE: &str = r#"Analyze the specification document: {filename}

Generate a comprehensive XTP (XML Test Plan) with:
1. All requirements extracted from the document
2. Test suites for each feature
3. Test cases with stimulus and expected results
4. Cross-feature integration tests

OUTPUT FORMAT (valid XML only, no markdown):

<?xml version="1.0" encoding="UTF-8"?>
<testplan name="{filename}_verification" version="1.0">
    <metadata>
        <author>VEGA XTP Generator</author>
        <methodology>Cognitive Verification Architecture</methodology>
        <book>Cognitive Verification Architecture: The VEGA Framework by Vikash</book>
        <source>{filename}</source>
    </metadata>

    <requirements>
        <requirement id="REQ_001" source="page X">[Requirement]</requirement>
    </requirements>

    <test_suite name="[feature]_tests">
        <test_case id="TC_001" name="[name]">
            <objective>[objective]</objective>
            <source>Page X</source>
            <preconditions>
                <condition>[condition]</condition>
            </preconditions>
            <stimulus>
                <step order="1">[step]</step>
                <step order="2">[step]</step>
            </stimulus>
            <expected_results>
                <result>[result]</result>
            </expected_results>
            <pass_criteria>[criteria]</pass_criteria>
        </test_case>
    </test_suite>

    <test_suite name="cross_feature_tests">
        <test_case id="TC_CF_001" name="[cross-feature test]">
            <objective>[Test interaction between features]</objective>
            <features_involved>[Feature A, Feature B]</features_involved>
            <stimulus>
                <step order="1">[step]</step>
            </stimulus>
            <expected_results>
                <result>[result]</result>
            </expected_results>
        </test_case>
    </test_suite>
</testplan>

IMPORTANT:
- Extract ALL requirements
- Include timing from diagrams
- Reference page numbers
- Include cross-feature tests
- Output ONLY valid XML, no explanations"#;

/// Standing instructions for the assistant backend.
pub const ASSISTANT_INSTRUCTIONS: &str = "You are an expert hardware verification engineer.
Your task is to analyze hardware specifications and generate comprehensive XML test plans.
Always output valid XML. Include requirements, test suites, and test cases.
Reference page numbers from the source document.";

/// Display name of the assistant created on the OpenAI side.
pub const ASSISTANT_NAME: &str = "VEGA XTP Generator";

/// Display name of the vector store holding the uploaded PDF.
pub const VECTOR_STORE_NAME: &str = "Spec Documents";

/// Render a prompt template for the given PDF file name.
pub fn render_prompt(template: &str, filename: &str) -> String {
    template.replace(FILENAME_PLACEHOLDER, filename)
}

/// Prefix for the text-only chat backend, which cannot see the document.
pub fn text_only_prompt(filename: &str, prompt: &str) -> String {
    format!("I have a PDF specification called {filename}. {prompt}")
}
