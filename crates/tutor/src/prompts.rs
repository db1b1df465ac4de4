//! Instruction templates for every workflow.
//!
//! The wording is aimed at the model, in Chinese, and is kept short: each
//! template names the role the model should play and the sections the
//! report must contain.

use mathdesk_core::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// System instruction for a typed-in mistake.
pub const MISTAKE_SYSTEM: &str = "你是一位初中数学名师。请给出考点、错因、2道变式题和全班讲评建议。";

/// System instruction for a photographed mistake.
pub const IMAGE_SYSTEM: &str = "你是一位初中数学名师，擅长批改学生作业照片。请先准确识别图中的题目和学生的作答过程，再给出考点、错因、正确解法和1道变式题。";

/// User text sent with a photo when the teacher adds no note.
pub const IMAGE_DEFAULT_NOTE: &str = "请识别这道题和学生的作答，指出错在哪里并给出正确解法。";

/// System instruction for lecture preparation.
pub const LECTURE_PREP_SYSTEM: &str = "你是数学特级教师。提供备课解析报告：1.满分板书作答 2.考点分布 3.命题意图 4.学生易错陷阱。";

/// Fewest submitted problems a progress report is based on.
pub const MIN_PROBLEMS_FOR_PROGRESS: usize = 2;

/// Largest quiz the generator will ask for.
pub const MAX_QUIZ_QUESTIONS: u8 = 10;

pub fn progress_prompt(student: &str, problems: &[String]) -> String {
    format!(
        "你是初中数学名师。基于学生【{student}】错题：\n{}\n提供阶段学情分析：1.知识漏洞 2.思维习惯 3.后续计划。",
        problems.join("\n")
    )
}

pub fn quiz_prompt(request: &QuizRequest) -> String {
    format!(
        "你是一名数学教师。针对【{}】出【{}】道难度为【{}】的题。要求：排版清晰，试卷末尾附详细解答。",
        request.topic.trim(),
        request.count,
        request.difficulty
    )
}

pub fn parallel_exam_prompt(paper: &str) -> String {
    format!(
        "你是一名中考命题专家。分析以下原题并出平行卷：\n{paper}\n要求：题型考点难度一致，数字背景不同，最后附解答。"
    )
}

/// Difficulty gradient for generated quizzes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Difficulty {
    /// 基础巩固
    Foundation,
    /// 中等强化
    #[default]
    Intermediate,
    /// 压轴拔高
    Challenge,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Foundation => "基础巩固",
            Difficulty::Intermediate => "中等强化",
            Difficulty::Challenge => "压轴拔高",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    /// Accepts the Chinese label or `foundation` / `intermediate` / `challenge`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "基础巩固" | "foundation" | "basic" => Ok(Difficulty::Foundation),
            "中等强化" | "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "压轴拔高" | "challenge" | "hard" => Ok(Difficulty::Challenge),
            other => Err(Error::validation(format!(
                "unknown difficulty '{other}' (expected 基础巩固, 中等强化 or 压轴拔高)"
            ))),
        }
    }
}

/// Parameters of a topic quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub topic: String,
    pub count: u8,
    pub difficulty: Difficulty,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, count: u8, difficulty: Difficulty) -> Self {
        Self {
            topic: topic.into(),
            count,
            difficulty,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::validation("quiz topic must not be empty"));
        }
        if !(1..=MAX_QUIZ_QUESTIONS).contains(&self.count) {
            return Err(Error::validation(format!(
                "question count must be between 1 and {MAX_QUIZ_QUESTIONS}"
            )));
        }
        Ok(())
    }
}
