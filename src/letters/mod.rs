use anyhow::{Context, Result};
use futures::{stream, StreamExt};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tokio::{fs, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    attendees::{AttendeeRecord, RecordSource},
    civic::{CivicInfoClient, Legislators},
    clean::{clean_phone_number, clean_zipcode, PhoneNumber},
};

/// Built-in thank-you letter, used when no template path is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/form_letter.html"
));

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("static regex"));

/// Everything one letter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub id: String,
    pub name: String,
    pub zipcode: String,
    pub phone: PhoneNumber,
    pub legislators: Legislators,
}

/// A letter body with `{{name}}`, `{{zipcode}}`, `{{phone}}` and
/// `{{legislators}}` placeholders.
#[derive(Debug, Clone)]
pub struct LetterTemplate {
    source: String,
}

impl Default for LetterTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl LetterTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read the template at `path`, or fall back to the built-in one.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let source = fs::read_to_string(p)
                    .await
                    .with_context(|| format!("reading letter template {}", p.display()))?;
                Ok(Self::new(source))
            }
            None => Ok(Self::default()),
        }
    }

    /// Fill in the placeholders with HTML-escaped values in a single pass.
    /// Unknown placeholders are left as written.
    pub fn render(&self, letter: &Letter) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| {
                let value = match &caps[1] {
                    "name" => letter.name.clone(),
                    "zipcode" => letter.zipcode.clone(),
                    "phone" => letter.phone.to_string(),
                    "legislators" => letter.legislators.display(),
                    _ => return caps[0].to_string(),
                };
                escape_html(&value)
            })
            .into_owned()
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep ids usable as a file-name fragment.
fn file_safe(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// Writes rendered letters as `<output_dir>/thanks_<id>.html`.
#[derive(Debug, Clone)]
pub struct LetterWriter {
    output_dir: PathBuf,
}

impl LetterWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn save_thank_you_letter(&self, id: &str, html: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating output directory {:?}", &self.output_dir))?;
        let path = self
            .output_dir
            .join(format!("thanks_{}.html", file_safe(id)));
        fs::write(&path, html)
            .await
            .with_context(|| format!("writing letter {:?}", &path))?;
        Ok(path)
    }
}

async fn write_letter(
    record: AttendeeRecord,
    civic: &CivicInfoClient,
    template: &LetterTemplate,
    writer: &LetterWriter,
) -> Result<PathBuf> {
    let zipcode = clean_zipcode(record.zipcode());
    let legislators = match civic.legislators_by_zipcode(&zipcode).await {
        Ok(officials) => Legislators::Found(officials),
        Err(e) => {
            warn!(id = record.id(), zipcode = %zipcode, "representative lookup failed: {:#}", e);
            Legislators::Unavailable
        }
    };

    let letter = Letter {
        id: record.id().to_string(),
        name: record.first_name().unwrap_or_default().to_string(),
        zipcode,
        phone: clean_phone_number(record.homephone()),
        legislators,
    };
    let html = template.render(&letter);
    writer.save_thank_you_letter(&letter.id, &html).await
}

/// Write a thank-you letter for every attendee, with up to `concurrency`
/// representative lookups in flight. Returns the number of letters written.
pub async fn process_attendees<S: RecordSource>(
    source: &mut S,
    civic: &CivicInfoClient,
    template: &LetterTemplate,
    writer: &LetterWriter,
    concurrency: usize,
) -> Result<usize> {
    let start = Instant::now();
    source.rewind()?;
    let attendees = source
        .records()
        .collect::<Result<Vec<_>, _>>()
        .context("reading attendee roster")?;
    info!(attendees = attendees.len(), "writing thank-you letters");

    let mut letters = stream::iter(attendees)
        .map(|record| write_letter(record, civic, template, writer))
        .buffer_unordered(concurrency.max(1));

    let mut written = 0;
    while let Some(res) = letters.next().await {
        let path = res?;
        debug!(path = %path.display(), "saved letter");
        written += 1;
    }

    info!(written, elapsed = ?start.elapsed(), "letters done");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendees::CsvSource;
    use crate::registration::{analyze_registration_times, ErrorPolicy, FrequencyMap};
    use reqwest::Client;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn letter() -> Letter {
        Letter {
            id: "1".into(),
            name: "Allison".into(),
            zipcode: "20010".into(),
            phone: PhoneNumber::Valid("6154385000".into()),
            legislators: Legislators::Unavailable,
        }
    }

    #[test]
    fn test_render_default_template() {
        let html = LetterTemplate::default().render(&letter());
        assert!(html.contains("<h1>Thanks Allison</h1>"));
        assert!(html.contains("zip code 20010 and phone number 6154385000"));
        assert!(html.contains("www.commoncause.org/take-action/find-elected-officials"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_escapes_values() {
        let mut l = letter();
        l.name = "<b>Tom & \"Jerry\"</b>".into();
        let html = LetterTemplate::new("Hi {{name}}").render(&l);
        assert_eq!(html, "Hi &lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let mut l = letter();
        l.name = "{{phone}}".into();
        let html = LetterTemplate::new("Hi {{name}}").render(&l);
        assert_eq!(html, "Hi {{phone}}");

        l.name = "{{legislators}}".into();
        let html = LetterTemplate::new("{{name}} / {{phone}} / {{unknown}}").render(&l);
        assert_eq!(html, "{{legislators}} / 6154385000 / {{unknown}}");
    }

    #[test]
    fn test_file_safe_ids() {
        assert_eq!(file_safe("42"), "42");
        assert_eq!(file_safe("../../etc/passwd"), "etcpasswd");
        assert_eq!(file_safe(""), "unknown");
    }

    #[tokio::test]
    async fn test_load_template_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letter.html");
        std::fs::write(&path, "Dear {{name}}").unwrap();

        let template = LetterTemplate::load(Some(path.as_path())).await.unwrap();
        assert_eq!(template.render(&letter()), "Dear Allison");

        let missing = dir.path().join("nope.html");
        assert!(LetterTemplate::load(Some(missing.as_path())).await.is_err());
    }

    #[tokio::test]
    async fn test_save_creates_output_dir() {
        let dir = tempdir().unwrap();
        let writer = LetterWriter::new(dir.path().join("output"));
        let path = writer.save_thank_you_letter("7", "<p>hi</p>").await.unwrap();

        assert_eq!(path, dir.path().join("output").join("thanks_7.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_process_attendees_falls_back_without_key() {
        let roster = ",RegDate,first_Name,last_Name,Email_Address,HomePhone,Street,City,State,Zipcode
1,11/12/08 10:47,Allison,Nguyen,arannon@jumpstartlab.com,6154385000,3155 19th St NW,Washington,DC,20010
2,11/12/08 13:23,SArah,Hankins,pinalevitsky@jumpstartlab.com,414-520-5000,2022 15th Street NW,Washington,DC,2009
3,11/12/08 13:30,Sarah,Xx,lqrm4462@jumpstartlab.com,(941)979-2000,4175 3rd Street North,Saint Petersburg,FL,
";
        let mut source = CsvSource::new(Cursor::new(roster)).unwrap();
        let civic =
            CivicInfoClient::new(Client::new(), "https://www.googleapis.com/civicinfo/v2", None)
                .unwrap();
        let dir = tempdir().unwrap();
        let writer = LetterWriter::new(dir.path());

        let written = process_attendees(
            &mut source,
            &civic,
            &LetterTemplate::new("{{name}}|{{zipcode}}|{{phone}}|{{legislators}}"),
            &writer,
            2,
        )
        .await
        .unwrap();
        assert_eq!(written, 3);

        let second = std::fs::read_to_string(dir.path().join("thanks_2.html")).unwrap();
        assert_eq!(
            second,
            format!("SArah|02009|4145205000|{}", crate::civic::FIND_REPRESENTATIVES)
        );
        let third = std::fs::read_to_string(dir.path().join("thanks_3.html")).unwrap();
        assert!(third.starts_with("Sarah|00000|9419792000|"));
    }

    #[tokio::test]
    async fn test_statistics_after_letters_on_same_roster() {
        let roster = ",RegDate,first_Name,HomePhone,Zipcode
1,1/1/17 10:00,Allison,6154385000,20010
2,1/1/17 10:15,Sarah,414-520-5000,20009
3,1/1/17 14:00,Jennifer,(941)979-2000,33703
";
        let mut source = CsvSource::new(Cursor::new(roster)).unwrap();
        let civic =
            CivicInfoClient::new(Client::new(), "https://www.googleapis.com/civicinfo/v2", None)
                .unwrap();
        let dir = tempdir().unwrap();

        let written = process_attendees(
            &mut source,
            &civic,
            &LetterTemplate::default(),
            &LetterWriter::new(dir.path()),
            4,
        )
        .await
        .unwrap();
        assert_eq!(written, 3);
        // the letter pass drained the reader
        assert!(source.next_record().is_none());

        let stats = analyze_registration_times(&mut source, ErrorPolicy::Abort).unwrap();
        assert_eq!(stats.hour_counts, FrequencyMap::from_counts([(10, 2), (14, 1)]));
        assert_eq!(stats.peak_hours.keys(), &[10]);
        assert_eq!(stats.day_counts, FrequencyMap::from_counts([(0, 3)]));
        assert_eq!(stats.peak_days.keys(), &[0]);
    }
}
