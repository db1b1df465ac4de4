//! Terminal rendering of reports and mistake books.
//!
//! Generated text is printed as-is (it is usually Markdown); only the
//! headings and record framing are added here.

use mathdesk_core::message::Role;
use mathdesk_core::record::{Record, RecordKind};

pub const MISTAKE_REPORT: &str = "🎯 错题分析报告";
pub const PHOTO_REPORT: &str = "📷 拍照错题分析报告";
pub const PROGRESS_REPORT: &str = "📈 专属阶段学情分析";
pub const PREP_REPORT: &str = "💡 备课解析报告";
pub const QUIZ_REPORT: &str = "🖨️ 专项测验";
pub const PARALLEL_REPORT: &str = "🖨️ 平行试卷";

/// A generated report under a Markdown heading.
pub fn report(title: &str, body: &str) -> String {
    format!("### {title}\n\n{}\n", body.trim_end())
}

/// One entry of a student's mistake book.
pub fn record(record: &Record) -> String {
    let time = record
        .time
        .as_deref()
        .map(|t| format!(" ({t})"))
        .unwrap_or_default();

    let heading = match (record.kind, record.role) {
        (RecordKind::TextExchange, Some(Role::User)) => "📝 录入错题".to_string(),
        (RecordKind::TextExchange, _) => "🤖 AI分析".to_string(),
        (RecordKind::ImageAnalysis, _) => {
            format!("📷 {}", record.label.as_deref().unwrap_or("拍照错题"))
        }
    };

    format!("{heading}{time}：\n{}\n", record.content.trim_end())
}

/// A student's whole mistake book.
pub fn history(student: &str, records: &[Record]) -> String {
    let mut out = format!("📖 【{student}】的错题本与学习记录\n");
    if records.is_empty() {
        out.push_str("\n  (暂无记录)\n");
        return out;
    }
    for r in records {
        out.push('\n');
        out.push_str(&record(r));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_has_heading_and_body() {
        let out = report(MISTAKE_REPORT, "考点：一元一次方程\n\n");
        assert_eq!(out, "### 🎯 错题分析报告\n\n考点：一元一次方程\n");
    }

    #[test]
    fn records_are_labelled_by_kind() {
        let user = Record::user("2+2=5").with_time(None);
        let reply = Record::assistant("加法错误").with_time(Some("2024-11-02 19:30:00".into()));
        let photo = Record::image_analysis("拍照错题分析", "符号错误").with_time(None);

        assert_eq!(record(&user), "📝 录入错题：\n2+2=5\n");
        assert_eq!(record(&reply), "🤖 AI分析 (2024-11-02 19:30:00)：\n加法错误\n");
        assert_eq!(record(&photo), "📷 拍照错题分析：\n符号错误\n");
    }

    #[test]
    fn empty_history_says_so() {
        let out = history("Alice", &[]);
        assert!(out.contains("【Alice】"));
        assert!(out.contains("暂无记录"));
    }
}
