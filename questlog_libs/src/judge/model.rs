use serde::{Deserialize, Serialize};

/// One submission as reported by the judge, before any mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub submission_id: i64,
    /// uHunt internal problem id, used to look up the problem metadata.
    pub problem_id: i64,
    pub verdict: i32,
    /// Milliseconds.
    pub run_time: f64,
    pub submit_time: i64,
    pub language: i32,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub number: i32,
    pub title: String,
}

/// Body of `/api/subs-user/{uid}`.
///
/// Each entry of `subs` is an array of
/// `[submission id, problem id, verdict, run time, submit time, language, rank]`.
#[derive(Debug, Deserialize)]
pub struct UserSubmissionsJson {
    pub name: String,
    pub uname: String,
    pub subs: Vec<(i64, i64, i32, f64, i64, i32, i64)>,
}

impl UserSubmissionsJson {
    pub fn into_submissions(self) -> Vec<RawSubmission> {
        self.subs
            .into_iter()
            .map(
                |(submission_id, problem_id, verdict, run_time, submit_time, language, rank)| {
                    RawSubmission {
                        submission_id,
                        problem_id,
                        verdict,
                        run_time,
                        submit_time,
                        language,
                        rank,
                    }
                },
            )
            .collect()
    }
}

/// Body of `/api/p/id/{pid}`. Only the fields kept on a quest are read.
#[derive(Debug, Deserialize)]
pub struct ProblemJson {
    pub pid: i64,
    pub num: i32,
    pub title: String,
}

impl From<ProblemJson> for ProblemMeta {
    fn from(problem: ProblemJson) -> Self {
        ProblemMeta {
            number: problem.num,
            title: problem.title,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_user_submissions() {
        let body = r#"{
            "name": "Alice Liddell",
            "uname": "alice",
            "subs": [
                [12345678, 36, 90, 120, 1262304000, 5, 1042],
                [12345679, 37, 70, 0, 1262304060, 3, -1]
            ]
        }"#;

        let json: UserSubmissionsJson = serde_json::from_str(body).unwrap();
        assert_eq!(json.uname, "alice");

        let submissions = json.into_submissions();
        assert_eq!(
            submissions,
            vec![
                RawSubmission {
                    submission_id: 12345678,
                    problem_id: 36,
                    verdict: 90,
                    run_time: 120.0,
                    submit_time: 1262304000,
                    language: 5,
                    rank: 1042,
                },
                RawSubmission {
                    submission_id: 12345679,
                    problem_id: 37,
                    verdict: 70,
                    run_time: 0.0,
                    submit_time: 1262304060,
                    language: 3,
                    rank: -1,
                },
            ]
        );
    }

    #[test]
    fn test_deserialize_problem() {
        let body = r#"{"pid":36,"num":100,"title":"The 3n + 1 problem","dacu":80000,"mrun":0,"mmem":0,"nover":0,"sube":0,"noj":0,"inq":0,"ce":0,"rf":0,"re":0,"ole":0,"tle":0,"mle":0,"wa":0,"pe":0,"ac":0,"rtl":3000,"status":1,"rej":0}"#;

        let problem: ProblemJson = serde_json::from_str(body).unwrap();
        assert_eq!(problem.pid, 36);
        assert_eq!(
            ProblemMeta::from(problem),
            ProblemMeta {
                number: 100,
                title: String::from("The 3n + 1 problem"),
            }
        );
    }
}
