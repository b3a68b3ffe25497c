//! Per-section LaTeX fragments.
//!
//! Every function here takes raw record text and escapes it exactly once.
//! Entries missing their essential fields are skipped, never reordered.

use crate::models::resume::{
    Award, Certification, Contact, Education, Experience, Publication, ResumeRecord, Skill,
};
use crate::render::escape::{escape_latex, escape_url, escape_with_links, href};
use crate::render::template::{Placeholder, SectionValues};

const LINK_SEPARATOR: &str = r" $\vert$ ";

/// Renders every placeholder value for `record`.
pub fn render_sections(record: &ResumeRecord) -> SectionValues {
    let mut values = SectionValues::new();
    values.insert(Placeholder::Name, escape_latex(record.name.trim()));
    values.insert(Placeholder::Contact, format_contact(&record.contact));
    values.insert(Placeholder::Summary, escape_latex(record.summary.trim()));
    values.insert(Placeholder::Skills, format_skills(&record.skills));
    values.insert(Placeholder::Experience, format_experience(&record.experience));
    values.insert(Placeholder::Education, format_education(&record.education));
    values.insert(Placeholder::Awards, format_awards(&record.awards));
    values.insert(
        Placeholder::Certifications,
        format_certifications(&record.certifications),
    );
    values.insert(
        Placeholder::Publications,
        format_publications(&record.publications, record.name.trim()),
    );
    values
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => escape_latex(s),
        ("", e) => escape_latex(e),
        (s, e) => format!("{} -- {}", escape_latex(s), escape_latex(e)),
    }
}

pub fn format_contact_links(contact: &Contact) -> String {
    contact
        .links
        .iter()
        .filter(|l| !is_blank(&l.name) && !is_blank(&l.url))
        .map(|l| href(&l.url, l.name.trim()))
        .collect::<Vec<_>>()
        .join(LINK_SEPARATOR)
}

/// Contact block: phone and email on the left, links and location on the right.
pub fn format_contact(contact: &Contact) -> String {
    let mut left = Vec::new();
    if !is_blank(&contact.phone) {
        left.push(format!("Phone: {}", escape_latex(contact.phone.trim())));
    }
    if !is_blank(&contact.email) {
        left.push(format!("Email: {}", escape_latex(contact.email.trim())));
    }

    let mut right = Vec::new();
    let links = format_contact_links(contact);
    if !links.is_empty() {
        right.push(links);
    }
    if !is_blank(&contact.location) {
        right.push(format!("Location: {}", escape_latex(contact.location.trim())));
    }

    match (left.is_empty(), right.is_empty()) {
        (true, true) => String::new(),
        (false, false) => format!(
            "\\begin{{tabular*}}{{\\textwidth}}{{l@{{\\extracolsep{{\\fill}}}}r}}\n  {} \\\\\n  {}\n\\end{{tabular*}}",
            left.join(" & "),
            right.join(" & ")
        ),
        (false, true) => format!(
            "\\begin{{tabular*}}{{\\textwidth}}{{l}}\n  {}\n\\end{{tabular*}}",
            left.join(" \\\\\n  ")
        ),
        (true, false) => format!(
            "\\begin{{tabular*}}{{\\textwidth}}{{r}}\n  {}\n\\end{{tabular*}}",
            right.join(" \\\\\n  ")
        ),
    }
}

pub fn format_skills(skills: &[Skill]) -> String {
    let mut out = String::new();
    for skill in skills {
        let items = skill.items.joined();
        if is_blank(&skill.category) || items.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "  \\resumeSubheading\n    {{{}}}{{}}\n    {{{}}}{{}}\n",
            escape_latex(skill.category.trim()),
            escape_latex(&items)
        ));
    }
    out
}

fn company_text(exp: &Experience) -> String {
    let company = match non_blank(&exp.company_url) {
        Some(url) => href(url, exp.company.trim()),
        None => escape_latex(exp.company.trim()),
    };
    match non_blank(&exp.company_description) {
        Some(desc) => format!("{company}{{: {}}}", escape_latex(desc)),
        None => company,
    }
}

pub fn format_experience(entries: &[Experience]) -> String {
    let mut out = String::new();
    for exp in entries {
        if is_blank(&exp.title) || is_blank(&exp.company) {
            continue;
        }
        out.push_str(&format!(
            "  \\resumeSubheading\n  {{{}}}{{{}}}\n  {{{}}}{{{}}}\n",
            escape_latex(exp.title.trim()),
            date_range(&exp.date_start, &exp.date_end),
            company_text(exp),
            escape_latex(exp.location.trim())
        ));

        let achievements: Vec<_> = exp
            .achievements
            .iter()
            .filter(|a| !is_blank(&a.name) || !is_blank(&a.description))
            .collect();
        if achievements.is_empty() {
            continue;
        }
        out.push_str("    \\resumeItemListStart\n");
        for achievement in achievements {
            out.push_str(&format!(
                "      \\resumeItem{{{}}}\n      {{{}}}\n",
                escape_latex(achievement.name.trim()),
                escape_with_links(achievement.description.trim())
            ));
        }
        out.push_str("    \\resumeItemListEnd\n");
    }
    out
}

pub fn format_education(entries: &[Education]) -> String {
    let mut out = String::new();
    for edu in entries {
        if is_blank(&edu.degree) || is_blank(&edu.institution) {
            continue;
        }
        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape_latex(edu.degree.trim()),
            date_range(&edu.date_start, &edu.date_end),
            escape_latex(edu.institution.trim()),
            escape_latex(edu.location.trim())
        ));
        if let Some(details) = non_blank(&edu.details) {
            out.push_str(&format!("      \\resumeDetail{{{}}}\n", escape_with_links(details)));
        }
    }
    out
}

fn organization_text(award: &Award) -> String {
    let organization = escape_latex(award.organization.trim());
    let Some(detail) = non_blank(&award.organization_detail) else {
        return organization;
    };
    match non_blank(&award.organization_url) {
        // Linked details show only the part after the last colon.
        Some(url) => {
            let label = detail.rsplit(':').next().unwrap_or(detail).trim();
            format!("{organization}{LINK_SEPARATOR}{}", href(url, label))
        }
        None => format!("{organization}{LINK_SEPARATOR}{}", escape_latex(detail)),
    }
}

pub fn format_awards(entries: &[Award]) -> String {
    let mut out = String::new();
    for award in entries {
        if is_blank(&award.title) || is_blank(&award.organization) {
            continue;
        }
        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape_latex(award.title.trim()),
            escape_latex(award.date.trim()),
            organization_text(award),
            escape_latex(award.location.trim())
        ));
    }
    out
}

pub fn format_certifications(entries: &[Certification]) -> String {
    let mut out = String::new();
    for cert in entries {
        if is_blank(&cert.title) || is_blank(&cert.organization) {
            continue;
        }
        let link = non_blank(&cert.url)
            .map(|url| href(url, "Certificate"))
            .unwrap_or_default();
        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape_latex(cert.title.trim()),
            escape_latex(cert.date.trim()),
            link,
            escape_latex(cert.organization.trim())
        ));
    }
    out
}

/// Numbered publication list. `highlight` (the resume owner's name) is set in
/// bold wherever it appears in an author list.
pub fn format_publications(entries: &[Publication], highlight: &str) -> String {
    let highlight = escape_latex(highlight);
    let items: Vec<String> = entries
        .iter()
        .filter(|p| !is_blank(&p.authors) && !is_blank(&p.title))
        .map(|p| {
            let mut authors = escape_latex(p.authors.trim());
            if !highlight.is_empty() {
                authors = bold_name(&authors, &highlight);
            }
            let mut parts = vec![authors, format!("``{}''", escape_latex(p.title.trim()))];
            if !is_blank(&p.venue) {
                parts.push(escape_latex(p.venue.trim()));
            }
            if !is_blank(&p.year) {
                parts.push(escape_latex(p.year.trim()));
            }
            let mut line = format!("{}.", parts.join(", "));
            if let Some(url) = non_blank(&p.url) {
                line.push_str(&format!(" \\href{{{}}}{{link}}", escape_url(url)));
            }
            format!("  \\item{{{line}}}\n")
        })
        .collect();
    items.join("  \\vspace{5pt}\n")
}

/// Bolds each occurrence of `name` in `authors` that is not part of a longer word.
fn bold_name(authors: &str, name: &str) -> String {
    let mut out = String::with_capacity(authors.len() + 16);
    let mut last = 0;
    for (start, _) in authors.match_indices(name) {
        let end = start + name.len();
        let before = authors[..start].chars().next_back();
        let after = authors[end..].chars().next();
        if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric) {
            continue;
        }
        out.push_str(&authors[last..start]);
        out.push_str(&format!("\\textbf{{{name}}}"));
        last = end;
    }
    out.push_str(&authors[last..]);
    out
}
