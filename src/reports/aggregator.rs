//! Reporting aggregator: processing-time and throughput metrics derived
//! from document history ledgers, scoped to the requesting user's
//! visibility.

use chrono::{Datelike, Duration, Months};

use crate::policy;
use crate::store::{department_name, Department, DocumentRecord, DocumentStatus, StepStatus, User, Workflow};

use super::types::{DepartmentDwell, MonthlyThroughput, Report, ReportOptions};

/// Pure function over the four inputs. Visibility: administrators see all
/// documents, health promoters their own, controller roles those whose
/// workflow path includes their department.
pub fn build_report(
    documents: &[DocumentRecord],
    workflows: &[Workflow],
    departments: &[Department],
    user: &User,
    opts: &ReportOptions,
) -> Report {
    let scoped = policy::report_scope(user, documents, workflows);

    let total_documents = scoped.len();
    let active_workflows = scoped
        .iter()
        .filter(|d| d.status == DocumentStatus::InProgress)
        .count();
    let total_rejected = scoped
        .iter()
        .filter(|d| d.status == DocumentStatus::Rejected)
        .count();

    let window_start = opts.now - Duration::days(opts.completed_window_days);
    let completed_recently = scoped
        .iter()
        .filter(|d| d.status == DocumentStatus::Completed)
        .filter(|d| {
            d.history
                .iter()
                .find(|h| h.status == StepStatus::Completed)
                .is_some_and(|h| h.timestamp >= window_start)
        })
        .count();

    let processing_times = dwell_times(&scoped, departments);
    // First-encountered wins on ties: strict comparison against the running
    // maximum.
    let bottleneck = processing_times
        .iter()
        .fold(None::<&DepartmentDwell>, |max, current| match max {
            Some(m) if current.avg_days > m.avg_days => Some(current),
            None => Some(current),
            _ => max,
        })
        .cloned();

    let workflow_efficiency = monthly_throughput(&scoped, opts);

    Report {
        total_documents,
        active_workflows,
        total_rejected,
        completed_recently,
        processing_times,
        bottleneck,
        workflow_efficiency,
    }
}

/// Walk consecutive history entries. A resolved entry's timestamp is the
/// moment it was approved or rejected, and the entry before it carries the
/// moment the step opened, so a step's dwell is the day-granularity gap
/// between the two. The bind entry itself has no earlier anchor and never
/// accrues measurable dwell.
fn dwell_times(documents: &[&DocumentRecord], departments: &[Department]) -> Vec<DepartmentDwell> {
    // First-encounter order matters for bottleneck tie-breaking, so no map.
    let mut per_department: Vec<(String, Vec<i64>)> = Vec::new();

    for doc in documents {
        for (entry, previous) in doc.history.iter().skip(1).zip(doc.history.iter()) {
            if !matches!(entry.status, StepStatus::Approved | StepStatus::Rejected) {
                continue;
            }
            let days = (entry.timestamp - previous.timestamp).num_days();
            if days >= 0 {
                match per_department
                    .iter_mut()
                    .find(|(id, _)| id == &entry.department_id)
                {
                    Some((_, times)) => times.push(days),
                    None => per_department.push((entry.department_id.clone(), vec![days])),
                }
            }
        }
    }

    per_department
        .into_iter()
        .map(|(department_id, times)| {
            let avg = if times.is_empty() {
                0.0
            } else {
                times.iter().sum::<i64>() as f64 / times.len() as f64
            };
            DepartmentDwell {
                department: department_name(departments, &department_id),
                department_id,
                avg_days: (avg * 10.0).round() / 10.0,
            }
        })
        .filter(|d| d.avg_days > 0.0)
        .collect()
}

/// Completed vs in-progress counts over the trailing months, bucketed by
/// the month of each document's first history entry. Rejected documents
/// fall into neither counter.
fn monthly_throughput(documents: &[&DocumentRecord], opts: &ReportOptions) -> Vec<MonthlyThroughput> {
    let mut buckets: Vec<MonthlyThroughput> = (0..opts.trailing_months)
        .rev()
        .filter_map(|back| opts.now.checked_sub_months(Months::new(back)))
        .map(|month_date| MonthlyThroughput {
            label: month_date.format("%b").to_string(),
            year: month_date.year(),
            month: month_date.month(),
            completed: 0,
            in_progress: 0,
        })
        .collect();

    for doc in documents {
        let Some(initiation) = doc.history.first() else {
            continue;
        };
        let (year, month) = (initiation.timestamp.year(), initiation.timestamp.month());
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == year && b.month == month)
        {
            match doc.status {
                DocumentStatus::Completed => bucket.completed += 1,
                DocumentStatus::InProgress => bucket.in_progress += 1,
                DocumentStatus::Rejected => {}
            }
        }
    }

    buckets
}
