// src/certificate.rs

use chrono::NaiveDate;
use url::Url;

use crate::{
    error::AppError,
    models::{certificate::CertificateData, exam::ExamResult},
    quiz::Outcome,
};

/// Public link printed on a certificate:
/// `{base}/verify/{user}/{course}?userName=..&courseName=..&score=..`.
pub fn verification_url(
    public_base_url: &str,
    user_id: &str,
    course_id: &str,
    user_name: &str,
    course_title: &str,
    score: u32,
) -> Result<String, AppError> {
    let mut url = Url::parse(public_base_url)
        .map_err(|e| AppError::InternalServerError(format!("Invalid PUBLIC_BASE_URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::InternalServerError("PUBLIC_BASE_URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["verify", user_id, course_id]);

    url.query_pairs_mut()
        .append_pair("userName", user_name)
        .append_pair("courseName", course_title)
        .append_pair("score", &score.to_string());

    Ok(url.into())
}

pub struct CertificateRequest<'a> {
    pub public_base_url: &'a str,
    pub user_id: &'a str,
    pub recipient_name: &'a str,
    pub course_id: &'a str,
    pub course_title: &'a str,
}

/// What a certificate attests: whether the attempt passed, its score and
/// the day it was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub passed: bool,
    pub score: u32,
    pub completed_on: NaiveDate,
}

impl From<&Outcome> for Achievement {
    fn from(outcome: &Outcome) -> Self {
        Self {
            passed: outcome.passed,
            score: outcome.score,
            completed_on: outcome.completed_at.date_naive(),
        }
    }
}

impl Achievement {
    /// From a stored attempt. `fallback` is used when the stored date is
    /// missing or unreadable.
    pub fn from_result(result: &ExamResult, fallback: NaiveDate) -> Self {
        Self {
            passed: result.passed,
            score: result.score_percent(),
            completed_on: result.finished_on().unwrap_or(fallback),
        }
    }
}

/// Certificate for a passed attempt. A failed attempt gets none.
pub fn issue(
    req: &CertificateRequest<'_>,
    achievement: &Achievement,
) -> Result<CertificateData, AppError> {
    if !achievement.passed {
        return Err(AppError::Forbidden(
            "A certificate requires a passing score".to_string(),
        ));
    }

    let verification_url = verification_url(
        req.public_base_url,
        req.user_id,
        req.course_id,
        req.recipient_name,
        req.course_title,
        achievement.score,
    )?;

    Ok(CertificateData {
        recipient_name: req.recipient_name.to_string(),
        course_title: req.course_title.to_string(),
        completion_date: achievement.completed_on,
        score: achievement.score,
        verification_url,
    })
}
