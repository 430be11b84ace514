//! Unit tests for aggregation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::ingester::Record;
    use crate::sentiment::ScoreOutcome;

    fn scored(topic: &str, created_at: &str, score: Option<f64>) -> ScoredRecord {
        let outcome = match score {
            Some(s) => ScoreOutcome::Scored(s),
            None => ScoreOutcome::Failed("capability error".to_string()),
        };
        ScoredRecord::new(
            Record {
                line: 0,
                text: String::new(),
                created_at: created_at.to_string(),
            },
            topic,
            outcome,
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_groups_by_topic_and_date() {
        let records = vec![
            scored("inflation", "2024-01-05T10:00:00Z", Some(1.0)),
            scored("inflation", "2024-01-05T18:00:00Z", Some(-1.0)),
            scored("inflation", "2024-01-05T19:00:00Z", Some(1.0)),
            scored("inflation", "2024-01-06T09:00:00Z", Some(0.0)),
            scored("housing", "2024-01-05T09:00:00Z", Some(-1.0)),
        ];

        let report = aggregate(&records);
        assert_eq!(report.rows.len(), 3);

        assert_eq!(report.rows[0].topic, "housing");
        assert_eq!(report.rows[0].mean_sentiment, -1.0);

        assert_eq!(report.rows[1].topic, "inflation");
        assert_eq!(report.rows[1].date, date("2024-01-05"));
        assert!((report.rows[1].mean_sentiment - 1.0 / 3.0).abs() < 1e-12);

        assert_eq!(report.rows[2].date, date("2024-01-06"));
        assert_eq!(report.rows[2].mean_sentiment, 0.0);
    }

    #[test]
    fn test_invalid_dates_dropped_silently() {
        let records = vec![
            scored("unemployment", "bad-date", Some(1.0)),
            scored("unemployment", "", Some(1.0)),
            scored("unemployment", "2024-01-05", Some(-1.0)),
        ];

        let report = aggregate(&records);
        assert_eq!(report.invalid_dates, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].mean_sentiment, -1.0);
    }

    #[test]
    fn test_all_null_group_omitted() {
        let records = vec![
            scored("housing", "2024-01-05", None),
            scored("housing", "2024-01-05", None),
            scored("other", "2024-01-05", Some(0.0)),
        ];

        let report = aggregate(&records);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].topic, "other");
        assert_eq!(report.empty_groups, 1);
        assert_eq!(report.null_scores, 2);
    }

    #[test]
    fn test_mixed_group_averages_non_null_only() {
        let records = vec![
            scored("inflation", "2024-01-05", Some(1.0)),
            scored("inflation", "2024-01-05", None),
            scored("inflation", "2024-01-05", Some(0.0)),
        ];

        let report = aggregate(&records);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].mean_sentiment, 0.5);
    }

    #[test]
    fn test_order_independent() {
        let mut records = vec![
            scored("b", "2024-01-02", Some(1.0)),
            scored("a", "2024-01-03", Some(-1.0)),
            scored("a", "2024-01-01", Some(0.0)),
            scored("b", "2024-01-02", Some(-1.0)),
            scored("a", "2024-01-03", Some(1.0)),
            scored("a", "2024-01-03", Some(1.0)),
        ];

        let forward = aggregate(&records);
        records.reverse();
        let backward = aggregate(&records);
        records.swap(0, 3);
        let shuffled = aggregate(&records);

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);

        let keys: Vec<(&str, NaiveDate)> = forward
            .rows
            .iter()
            .map(|r| (r.topic.as_str(), r.date))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a", date("2024-01-01")),
                ("a", date("2024-01-03")),
                ("b", date("2024-01-02")),
            ]
        );
    }

    #[test]
    fn test_means_stay_in_range() {
        let records: Vec<ScoredRecord> = (0..100)
            .map(|i| {
                let s = [1.0, -1.0, 0.0][i % 3];
                scored("other", "2024-02-01", Some(s))
            })
            .collect();

        let report = aggregate(&records);
        for row in &report.rows {
            assert!((-1.0..=1.0).contains(&row.mean_sentiment));
        }
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[]);
        assert!(report.rows.is_empty());
        assert_eq!(report, AggregateReport::default());
    }
}
