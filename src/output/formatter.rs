//! Output formatters: console, JSON, Markdown and HTML

use crate::config::OutputFormat;
use crate::error::{Result, ResumeScorerError};
use crate::output::report::MatchReport;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering a match report
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter, the plain analysis text with optional color and detail
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
    /// Emit only `{analysis, match_score}` instead of the full report
    response_only: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

struct HtmlRow {
    requirement: String,
    resume_segment: String,
    similarity: String,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Match Report</title>
    {% if include_styles %}
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f5f7fa; color: #2d3748; }
        .container { max-width: 960px; margin: 0 auto; padding: 24px; }
        .card { background: #fff; border-radius: 8px; padding: 20px 24px; margin-bottom: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
        .score { font-size: 48px; font-weight: 700; }
        .score-strong { color: #2f855a; }
        .score-moderate { color: #b7791f; }
        .score-weak { color: #c53030; }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #e2e8f0; vertical-align: top; }
        .metadata { font-size: 13px; color: #718096; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>Resume Match Report</h1>
            <div class="score {{ score_class }}">{{ match_score }}/100</div>
            <p>{{ assessment }}</p>
        </div>

        <div class="card">
            <h2>Key Strengths</h2>
            {% if strengths.is_empty() %}
            <p>No strong matches found</p>
            {% else %}
            <table>
                <tr><th>Requirement</th><th>Your experience</th><th>Similarity</th></tr>
                {% for row in strengths %}
                <tr><td>{{ row.requirement }}</td><td>{{ row.resume_segment }}</td><td>{{ row.similarity }}</td></tr>
                {% endfor %}
            </table>
            {% endif %}
        </div>

        <div class="card">
            <h2>Suggested Improvements</h2>
            {% if improvements.is_empty() %}
            <p>No moderate matches found</p>
            {% else %}
            <table>
                <tr><th>Requirement</th><th>Your experience</th><th>Similarity</th></tr>
                {% for row in improvements %}
                <tr><td>{{ row.requirement }}</td><td>{{ row.resume_segment }}</td><td>{{ row.similarity }}</td></tr>
                {% endfor %}
            </table>
            {% endif %}
        </div>

        <div class="card">
            <h2>Areas that need attention</h2>
            {% if gaps.is_empty() %}
            <p>No significant gaps found</p>
            {% else %}
            <ul>
                {% for row in gaps %}
                <li>{{ row.requirement }} <span class="metadata">(best match {{ row.similarity }})</span></li>
                {% endfor %}
            </ul>
            {% endif %}
        </div>

        {% if !matched_skills.is_empty() || !missing_skills.is_empty() %}
        <div class="card">
            <h2>Skills</h2>
            <p><strong>Coverage:</strong> {{ skill_coverage }}</p>
            {% if !matched_skills.is_empty() %}
            <p><strong>Found:</strong> {{ matched_skills.join(", ") }}</p>
            {% endif %}
            {% if !missing_skills.is_empty() %}
            <p><strong>Missing:</strong> {{ missing_skills.join(", ") }}</p>
            {% endif %}
        </div>
        {% endif %}

        <div class="metadata">
            <p>Generated by resume-scorer v{{ version }} on {{ generated_at }} in {{ processing_time }}ms</p>
            <p>Model: {{ embedding_model }} | Resume: {{ resume_source }} | Job: {{ job_source }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    match_score: u8,
    score_class: &'static str,
    assessment: String,
    strengths: Vec<HtmlRow>,
    improvements: Vec<HtmlRow>,
    gaps: Vec<HtmlRow>,
    matched_skills: Vec<String>,
    missing_skills: Vec<String>,
    skill_coverage: String,
    version: String,
    generated_at: String,
    processing_time: u64,
    embedding_model: String,
    resume_source: String,
    job_source: String,
}

fn score_color(score: u8) -> Color {
    match score {
        80..=100 => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("{}\n", title.bold())
        } else {
            format!("{}\n", title)
        }
    }

    fn push_lines(&self, output: &mut String, lines: &[String], empty: &str, color: Color) {
        if lines.is_empty() {
            output.push_str(empty);
            output.push('\n');
        }
        for line in lines {
            output.push_str(&self.colorize(line, color));
            output.push('\n');
        }
        output.push('\n');
    }

    fn format_details(&self, report: &MatchReport) -> String {
        let mut output = String::new();

        output.push_str(&self.format_header("Relevant Matches:"));
        if report.relevant_matches.is_empty() {
            output.push_str("- None above the relevance floor\n");
        }
        for m in &report.relevant_matches {
            output.push_str(&format!(
                "- [{:.2}] '{}' <- '{}'\n",
                m.similarity, m.requirement, m.resume_segment
            ));
        }
        output.push('\n');

        let coverage = &report.skill_coverage;
        output.push_str(&self.format_header("Skills:"));
        output.push_str(&format!("Coverage: {:.0}%\n", coverage.coverage * 100.0));
        if !coverage.matched.is_empty() {
            output.push_str(&format!(
                "Found: {}\n",
                self.colorize(&coverage.matched.join(", "), Color::Green)
            ));
        }
        for fuzzy in &coverage.fuzzy {
            output.push_str(&format!(
                "Similar: {} ~ {} ({:.2})\n",
                fuzzy.skill, fuzzy.matched_text, fuzzy.similarity
            ));
        }
        if !coverage.missing.is_empty() {
            output.push_str(&format!(
                "Missing: {}\n",
                self.colorize(&coverage.missing.join(", "), Color::Red)
            ));
        }
        output.push('\n');

        if !report.experience_requirements.is_empty() {
            output.push_str(&self.format_header("Experience Requirements:"));
            for requirement in &report.experience_requirements {
                output.push_str(&format!("- {}\n", requirement));
            }
            output.push('\n');
        }

        output.push_str(&self.format_header("Resume Sections:"));
        if report.resume_sections.is_empty() {
            output.push_str("- No standard section headings detected\n");
        } else {
            output.push_str(&format!("{}\n", report.resume_sections.join(", ")));
        }
        output.push('\n');

        let meta = &report.metadata;
        output.push_str(&format!(
            "Model: {} | Score mode: {:?} | Similarity: {:.4} | {} resume segments, {} requirements | {}ms\n",
            meta.embedding_model,
            meta.score_mode,
            meta.raw_similarity,
            meta.resume_segment_count,
            meta.requirement_count,
            meta.processing_time_ms
        ));

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if !self.use_colors && !self.detailed {
            return Ok(report.analysis_text());
        }

        let mut output = String::new();

        let score = format!("{}/100", report.match_score);
        output.push_str(&format!(
            "{} {}\n\n",
            self.format_header("1. Overall Match Score:").trim_end(),
            self.colorize(&score, score_color(report.match_score))
        ));

        output.push_str(&self.format_header("2. Key Strengths:"));
        self.push_lines(&mut output, &report.strength_lines(), "- No strong matches found", Color::Green);

        output.push_str(&self.format_header("3. Suggested Improvements:"));
        self.push_lines(&mut output, &report.improvement_lines(), "- No moderate matches found", Color::Yellow);

        output.push_str(&self.format_header("4. Areas that need attention:"));
        self.push_lines(&mut output, &report.gap_lines(), "- No significant gaps found", Color::Red);

        output.push_str(&self.format_header("5. Overall Assessment:"));
        output.push_str(&self.colorize(&report.assessment, Color::Cyan));

        if self.detailed {
            output.push_str("\n\n");
            output.push_str(&self.format_details(report));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            response_only: false,
        }
    }

    pub fn response_only(mut self, response_only: bool) -> Self {
        self.response_only = response_only;
        self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let value = if self.response_only {
            serde_json::to_value(report.to_response())?
        } else {
            serde_json::to_value(report)?
        };

        if self.pretty {
            Ok(serde_json::to_string_pretty(&value)?)
        } else {
            Ok(serde_json::to_string(&value)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_table(rows: &[(String, String, f32)]) -> String {
        let mut output = String::from("| Requirement | Your experience | Similarity |\n");
        output.push_str("|-------------|-----------------|------------|\n");
        for (requirement, segment, similarity) in rows {
            output.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                escape_table_cell(requirement),
                escape_table_cell(segment),
                similarity
            ));
        }
        output
    }
}

fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Match Report\n\n");

        if self.include_metadata {
            let meta = &report.metadata;
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                meta.processing_time_ms
            ));
            output.push_str(&format!(
                "**Resume:** `{}` | **Job:** `{}` | **Model:** `{}`\n\n",
                meta.resume_source, meta.job_source, meta.embedding_model
            ));
        }

        output.push_str(&format!("## Overall Match Score: {}/100\n\n", report.match_score));
        output.push_str(&format!("> {}\n\n", report.assessment));

        output.push_str("## Key Strengths\n\n");
        if report.strengths.is_empty() {
            output.push_str("No strong matches found\n\n");
        } else {
            let rows: Vec<_> = report
                .strengths
                .iter()
                .map(|m| (m.requirement.clone(), m.resume_segment.clone(), m.similarity))
                .collect();
            output.push_str(&Self::markdown_table(&rows));
            output.push('\n');
        }

        output.push_str("## Suggested Improvements\n\n");
        if report.improvements.is_empty() {
            output.push_str("No moderate matches found\n\n");
        } else {
            let rows: Vec<_> = report
                .improvements
                .iter()
                .map(|m| (m.requirement.clone(), m.resume_segment.clone(), m.similarity))
                .collect();
            output.push_str(&Self::markdown_table(&rows));
            output.push('\n');
        }

        output.push_str("## Areas that need attention\n\n");
        if report.gaps.is_empty() {
            output.push_str("No significant gaps found\n\n");
        } else {
            for gap in &report.gaps {
                output.push_str(&format!(
                    "- {} (best match {:.2})\n",
                    gap.requirement, gap.best_similarity
                ));
            }
            output.push('\n');
        }

        let coverage = &report.skill_coverage;
        if !coverage.matched.is_empty() || !coverage.missing.is_empty() {
            output.push_str("## Skills\n\n");
            output.push_str(&format!("**Coverage:** {:.0}%\n\n", coverage.coverage * 100.0));
            if !coverage.matched.is_empty() {
                output.push_str(&format!("**Found:** {}\n\n", coverage.matched.join(", ")));
            }
            if !coverage.missing.is_empty() {
                output.push_str(&format!("**Missing:** {}\n\n", coverage.missing.join(", ")));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &MatchReport) -> HtmlTemplate {
        let score_class = match report.match_score {
            80..=100 => "score-strong",
            50..=79 => "score-moderate",
            _ => "score-weak",
        };

        let match_rows = |matches: &[crate::processing::classifier::RequirementMatch]| {
            matches
                .iter()
                .map(|m| HtmlRow {
                    requirement: m.requirement.clone(),
                    resume_segment: m.resume_segment.clone(),
                    similarity: format!("{:.2}", m.similarity),
                })
                .collect::<Vec<_>>()
        };

        let meta = &report.metadata;
        HtmlTemplate {
            include_styles: self.include_styles,
            match_score: report.match_score,
            score_class,
            assessment: report.assessment.clone(),
            strengths: match_rows(&report.strengths),
            improvements: match_rows(&report.improvements),
            gaps: report
                .gaps
                .iter()
                .map(|g| HtmlRow {
                    requirement: g.requirement.clone(),
                    resume_segment: String::new(),
                    similarity: format!("{:.2}", g.best_similarity),
                })
                .collect(),
            matched_skills: report.skill_coverage.matched.clone(),
            missing_skills: report.skill_coverage.missing.clone(),
            skill_coverage: format!("{:.0}%", report.skill_coverage.coverage * 100.0),
            version: meta.scorer_version.clone(),
            generated_at: meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            processing_time: meta.processing_time_ms,
            embedding_model: meta.embedding_model.clone(),
            resume_source: meta.resume_source.clone(),
            job_source: meta.job_source.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ResumeScorerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn json_response_only(mut self, response_only: bool) -> Self {
        self.json_formatter = self.json_formatter.response_only(response_only);
        self
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };

    format!("{}_match{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::tests::sample_outcome;
    use tempfile::TempDir;

    fn sample_report() -> MatchReport {
        MatchReport::from_outcome(sample_outcome(), "resume.pdf", "job.txt")
    }

    #[test]
    fn test_plain_console_is_the_analysis_text() {
        let report = sample_report();
        let output = ConsoleFormatter::new(false, false).format_report(&report).unwrap();
        assert_eq!(output, report.analysis_text());
    }

    #[test]
    fn test_detailed_console_adds_skills_and_sections() {
        let report = sample_report();
        let output = ConsoleFormatter::new(false, true).format_report(&report).unwrap();

        assert!(output.starts_with("1. Overall Match Score: 83/100"));
        assert!(output.contains("Coverage: 50%"));
        assert!(output.contains("Missing: Kubernetes"));
        assert!(output.contains("Experience, Skills"));
        assert!(output.contains("5+ years of backend development"));
    }

    #[test]
    fn test_json_response_only() {
        let report = sample_report();
        let output = JsonFormatter::new(false)
            .response_only(true)
            .format_report(&report)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["match_score"], 83);
        assert_eq!(value["analysis"], report.analysis_text());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_json_full_report() {
        let output = JsonFormatter::new(true).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["strengths"][0]["requirement"], "Experience with Rust");
        assert_eq!(value["metadata"]["embedding_model"], "potion-base-8M");
    }

    #[test]
    fn test_markdown_has_tables_and_escapes_pipes() {
        let mut report = sample_report();
        report.strengths[0].requirement = "Rust | Go".to_string();

        let output = MarkdownFormatter::new(true).format_report(&report).unwrap();

        assert!(output.starts_with("# Resume Match Report"));
        assert!(output.contains("## Overall Match Score: 83/100"));
        assert!(output.contains("| Rust \\| Go | Built services in Rust | 0.82 |"));
        assert!(output.contains("- Mentoring junior engineers (best match 0.12)"));
    }

    #[test]
    fn test_html_escapes_content() {
        let mut report = sample_report();
        report.gaps[0].requirement = "<script>alert(1)</script>".to_string();

        let output = HtmlFormatter::new(false).format_report(&report).unwrap();

        assert!(output.contains("83/100"));
        assert!(output.contains("score-strong"));
        assert!(!output.contains("<script>"));
        assert!(!output.contains("<style>"));
    }

    #[test]
    fn test_generator_dispatches_by_format() {
        let generator = ReportGenerator::with_options(false, false, true, false);
        let report = sample_report();

        for format in [OutputFormat::Console, OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Html] {
            assert!(!generator.generate_report(&report, &format).unwrap().is_empty());
        }
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("report.md");

        save_report_to_file("# Report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report");

        assert_eq!(
            suggest_filename(&OutputFormat::Json, "docs/jane_resume.pdf", false),
            "jane_resume_match.json"
        );
        assert!(suggest_filename(&OutputFormat::Html, "cv.pdf", true).ends_with(".html"));
    }
}
