//! Payloads exchanged with the AI assistant endpoint
//!
//! The library never calls the assistant itself. It builds the request body
//! from a detached snapshot of the grid and parses whatever comes back.

use serde::{Deserialize, Serialize};

use gridpilot_core::{CellValue, Spreadsheet};

use crate::error::{Error, Result};

/// What the assistant is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantAction {
    Analyze,
    Generate,
    Format,
    Chat,
}

/// Request body: `{"action": ..., "data"?: [[...]], "context"?: "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub action: AssistantAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<CellValue>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl AssistantRequest {
    pub fn new(action: AssistantAction) -> Self {
        Self {
            action,
            data: None,
            context: None,
        }
    }

    /// Attach the value grid of a sheet (the active one when `sheet` is `None`)
    pub fn with_grid(mut self, spreadsheet: &Spreadsheet, sheet: Option<&str>) -> Result<Self> {
        self.data = Some(spreadsheet.grid_snapshot(sheet)?);
        Ok(self)
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Response body: `{"result": "..."}` or `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistantResponse {
    Result { result: String },
    Error { error: String },
}

impl AssistantResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The result text, or [`Error::Assistant`] carrying the error text
    pub fn into_result(self) -> Result<String> {
        match self {
            AssistantResponse::Result { result } => Ok(result),
            AssistantResponse::Error { error } => Err(Error::Assistant(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_json_shape() {
        let mut spreadsheet = Spreadsheet::new();
        spreadsheet.set_cell_value("A1", "Product", None).unwrap();
        spreadsheet.set_cell_value("B2", 5, None).unwrap();
        spreadsheet.set_cell_value("C1", true, None).unwrap();

        let request = AssistantRequest::new(AssistantAction::Analyze)
            .with_grid(&spreadsheet, None)
            .unwrap()
            .with_context("quarterly sales");

        assert_eq!(
            request.to_json().unwrap(),
            r#"{"action":"analyze","data":[["Product",null,true],[null,5.0,null]],"context":"quarterly sales"}"#
        );
    }

    #[test]
    fn test_request_omits_missing_fields() {
        let request = AssistantRequest::new(AssistantAction::Chat);
        assert_eq!(request.to_json().unwrap(), r#"{"action":"chat"}"#);

        let parsed: AssistantRequest =
            serde_json::from_str(r#"{"action":"format","data":[[1,"x",false,null]]}"#).unwrap();
        assert_eq!(parsed.action, AssistantAction::Format);
        assert_eq!(
            parsed.data,
            Some(vec![vec![
                CellValue::Number(1.0),
                CellValue::string("x"),
                CellValue::Boolean(false),
                CellValue::Empty,
            ]])
        );
    }

    #[test]
    fn test_grid_of_unknown_sheet() {
        let spreadsheet = Spreadsheet::new();
        let result =
            AssistantRequest::new(AssistantAction::Generate).with_grid(&spreadsheet, Some("Nope"));
        assert!(matches!(result, Err(Error::Core(_))));
    }

    #[test]
    fn test_response_variants() {
        let ok = AssistantResponse::from_json(r#"{"result":"Revenue is up 12%"}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), "Revenue is up 12%");

        let err =
            AssistantResponse::from_json(r#"{"error":"Failed to process request"}"#).unwrap();
        assert!(matches!(
            err.into_result(),
            Err(Error::Assistant(msg)) if msg == "Failed to process request"
        ));

        assert!(AssistantResponse::from_json(r#"{"unexpected":1}"#).is_err());
    }
}
