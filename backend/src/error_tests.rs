#[cfg(test)]
mod error_tests {
    use crate::error::ApiError;
    use actix_web::ResponseError;
    use shared::SharedError;
    use test_case::test_case;

    #[test]
    fn test_malformed_record_keeps_row() {
        let error: ApiError = SharedError::malformed(7, "invalid choice 'E'").into();

        assert_eq!(error.error, "MALFORMED_RECORD");
        assert_eq!(error.status_code, 422);
        assert_eq!(error.row, Some(7));
        assert_eq!(error.message, "invalid choice 'E'");
    }

    #[test]
    fn test_malformed_record_body_is_structured() {
        let error = ApiError::malformed_record(3, "gap in sequence_index");
        let body = serde_json::to_value(&error).unwrap();

        assert_eq!(body["error"], "MALFORMED_RECORD");
        assert_eq!(body["row"], 3);
        assert_eq!(body["status_code"], 422);
    }

    #[test]
    fn test_row_is_omitted_for_other_errors() {
        let body = serde_json::to_value(ApiError::internal_error("boom")).unwrap();
        assert!(body.get("row").is_none());
    }

    #[test_case(SharedError::Io("no such file".into()), 500, "STORAGE_ERROR")]
    #[test_case(SharedError::Conversion("bad json".into()), 422, "UNPROCESSABLE_DATA")]
    #[test_case(SharedError::Validation("bad".into()), 400, "VALIDATION_ERROR")]
    #[test_case(SharedError::BadRequest("bad".into()), 400, "BAD_REQUEST")]
    #[test_case(SharedError::NotFound("gone".into()), 404, "NOT_FOUND")]
    #[test_case(SharedError::Internal("join".into()), 500, "INTERNAL_ERROR")]
    fn test_shared_error_mapping(source: SharedError, status: u16, code: &str) {
        let error: ApiError = source.into();
        assert_eq!(error.status_code, status);
        assert_eq!(error.error, code);
        assert_eq!(error.error_response().status().as_u16(), status);
    }
}
