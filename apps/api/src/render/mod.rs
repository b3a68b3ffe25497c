// Document rendering: record + template -> LaTeX -> PDF.
// The pure half (escape, sections, template) never touches the filesystem;
// engine and pipeline own all I/O.

pub mod engine;
pub mod escape;
pub mod pipeline;
pub mod sections;
pub mod template;

use thiserror::Error;

use crate::models::resume::ResumeRecord;

pub use engine::{PdfLatex, TypesetEngine};
pub use pipeline::generate;
pub use template::Template;

/// Every way turning a record into a document can fail.
///
/// All variants are deterministic for a given input, so none are retried.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Record is missing a required field or does not match the schema.
    #[error("Data error: {0}")]
    Data(String),

    /// Template is malformed.
    #[error("Template error: {0}")]
    Template(String),

    /// The typesetting engine failed; carries its diagnostics verbatim.
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders `record` into a complete LaTeX document using `template`.
pub fn render(record: &ResumeRecord, template: &Template) -> Result<String, RenderError> {
    record.validate()?;
    let values = sections::render_sections(record);
    Ok(template.fill(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{
        Achievement, Award, Certification, Contact, ContactLink, Education, Experience,
        Publication, Skill, SkillItems,
    };

    fn jane_roe() -> ResumeRecord {
        ResumeRecord::from_json_slice(
            br#"{
                "name": "Jane Roe",
                "contact": {"email": "jane@x.com"},
                "skills": [{"category": "Languages", "items": "Python"}],
                "experience": [],
                "education": [],
                "awards": [],
                "certifications": [],
                "publications": []
            }"#,
        )
        .unwrap()
    }

    fn sample() -> ResumeRecord {
        ResumeRecord::from_json_slice(include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/resume.json"
        )))
        .unwrap()
    }

    /// Every reserved character, delimited so each rendered copy can be found.
    const TEXT: &str = r"«a&b%c$d#e_f{g}h~i^j\k»";
    /// A URL carrying the same characters.
    const URL: &str = r"‹https://x.com/a&b%c$d#e_f{g}h~i^j\k›";

    const TEXT_ESCAPES: &[&str] = &[
        r"\&",
        r"\%",
        r"\$",
        r"\#",
        r"\_",
        r"\{",
        r"\}",
        r"\textbackslash{}",
        r"\textasciitilde{}",
        r"\textasciicircum{}",
    ];

    fn hostile_record() -> ResumeRecord {
        let text = || TEXT.to_string();
        ResumeRecord {
            name: text(),
            contact: Contact {
                phone: text(),
                email: text(),
                location: text(),
                links: vec![ContactLink { name: text(), url: URL.to_string() }],
            },
            summary: text(),
            skills: vec![Skill {
                category: text(),
                items: SkillItems::List(vec![text(), text()]),
            }],
            experience: vec![Experience {
                title: text(),
                company: text(),
                company_url: Some(URL.to_string()),
                company_description: Some(text()),
                location: text(),
                date_start: text(),
                date_end: text(),
                achievements: vec![Achievement {
                    name: text(),
                    description: format!("{TEXT} [{TEXT}]({URL}) {TEXT}"),
                }],
            }],
            education: vec![Education {
                degree: text(),
                institution: text(),
                location: text(),
                date_start: text(),
                date_end: text(),
                details: Some(format!("{TEXT} [{TEXT}]({URL})")),
            }],
            awards: vec![Award {
                title: text(),
                organization: text(),
                organization_detail: Some(text()),
                organization_url: Some(URL.to_string()),
                location: text(),
                date: text(),
            }],
            certifications: vec![Certification {
                title: text(),
                organization: text(),
                url: Some(URL.to_string()),
                date: text(),
            }],
            publications: vec![Publication {
                authors: format!("{TEXT}, A. Other"),
                title: text(),
                venue: text(),
                year: text(),
                url: Some(URL.to_string()),
            }],
        }
    }

    fn delimited<'a>(doc: &'a str, open: char, close: char) -> Vec<&'a str> {
        let mut found = Vec::new();
        let mut rest = doc;
        while let Some(start) = rest.find(open) {
            let after = &rest[start + open.len_utf8()..];
            let end = after.find(close).expect("unterminated copy");
            found.push(&after[..end]);
            rest = &after[end..];
        }
        found
    }

    /// First character in rendered text that is neither plain nor escaped.
    fn unescaped_in_text(segment: &str) -> Option<char> {
        let mut rest = segment;
        while let Some(c) = rest.chars().next() {
            if c == '\\' {
                match TEXT_ESCAPES.iter().find(|e| rest.starts_with(**e)) {
                    Some(esc) => rest = &rest[esc.len()..],
                    None => return Some(c),
                }
                continue;
            }
            if "&%$#_{}~^".contains(c) {
                return Some(c);
            }
            rest = &rest[c.len_utf8()..];
        }
        None
    }

    /// First character in a rendered `\href` URL that TeX would interpret.
    fn unescaped_in_url(segment: &str) -> Option<char> {
        let mut rest = segment;
        while let Some(c) = rest.chars().next() {
            if c == '\\' {
                if rest.starts_with(r"\%") || rest.starts_with(r"\#") {
                    rest = &rest[2..];
                    continue;
                }
                return Some(c);
            }
            if c.is_whitespace() || "%#{}~^$".contains(c) {
                return Some(c);
            }
            rest = &rest[c.len_utf8()..];
        }
        None
    }

    /// Brace depth never dips below zero and ends at zero; no raw `%` anywhere.
    fn assert_balanced(doc: &str) {
        let mut depth = 0i64;
        let mut chars = doc.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    assert!(depth >= 0, "unbalanced closing brace");
                }
                '%' => panic!("raw comment character in rendered document"),
                _ => {}
            }
        }
        assert_eq!(depth, 0, "unclosed brace");
    }

    #[test]
    fn test_jane_roe_end_to_end_markup() {
        let template = Template::standard().unwrap();
        let out = render(&jane_roe(), &template).unwrap();
        assert!(out.contains("\\textbf{Jane Roe}"));
        assert!(out.contains("{Python}{}"));
        assert!(out.contains("Email: jane@x.com"));
        assert!(out.contains("\\section{Technical Skills}"));
        assert!(!out.contains("\\section{Professional Experience}"));
        assert!(!out.contains("\\section{Awards and Honors}"));
        assert!(!out.contains("\\section{Certifications}"));
        assert!(!out.contains("\\section{Selected Publications}"));
        assert!(!out.contains("<<"));
        assert!(!out.contains("% BEGIN:"));
        assert!(out.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = Template::standard().unwrap();
        let record = sample();
        assert_eq!(render(&record, &template).unwrap(), render(&record, &template).unwrap());
    }

    #[test]
    fn test_no_unescaped_reserved_characters_from_record() {
        let template = Template::standard().unwrap();
        let out = render(&hostile_record(), &template).unwrap();

        let texts = delimited(&out, '«', '»');
        assert!(texts.len() >= 30, "only {} text copies rendered", texts.len());
        for segment in texts {
            assert_eq!(unescaped_in_text(segment), None, "in {segment:?}");
        }

        let urls = delimited(&out, '‹', '›');
        assert_eq!(urls.len(), 7, "every link site renders its URL");
        for segment in urls {
            assert_eq!(unescaped_in_url(segment), None, "in {segment:?}");
        }

        assert_balanced(&out);
    }

    #[test]
    fn test_ampersand_appears_escaped_once_in_document() {
        let template = Template::standard().unwrap();
        let mut record = jane_roe();
        record.experience.push(Experience {
            title: "Analyst".to_string(),
            company: "C&A Corp".to_string(),
            company_url: None,
            company_description: None,
            location: String::new(),
            date_start: String::new(),
            date_end: String::new(),
            achievements: vec![],
        });
        let out = render(&record, &template).unwrap();
        assert_eq!(out.matches("C\\&A Corp").count(), 1);
        assert!(!out.contains("C\\\\&A"));
        assert!(out.contains("\\section{Professional Experience}"));
    }

    #[test]
    fn test_blank_name_is_data_error() {
        let template = Template::standard().unwrap();
        let mut record = jane_roe();
        record.name = String::new();
        assert!(matches!(render(&record, &template), Err(RenderError::Data(_))));
    }

    #[test]
    fn test_full_sample_renders_every_section() {
        let template = Template::standard().unwrap();
        let out = render(&sample(), &template).unwrap();
        for heading in [
            "Professional Summary",
            "Technical Skills",
            "Professional Experience",
            "Education",
            "Awards and Honors",
            "Certifications",
            "Selected Publications",
        ] {
            assert!(out.contains(&format!("\\section{{{heading}}}")), "missing {heading}");
        }
        let senior = out.find("Senior Software Engineer").unwrap();
        let junior = out.find("{Software Engineer}").unwrap();
        assert!(senior < junior);
    }
}
