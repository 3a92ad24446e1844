//! GraphQL documents understood by the worker.

pub const STATUS_QUERY: &str = r"
  query Status {
    status {
      message
      model
    }
  }
";

pub const HEALTH_QUERY: &str = r"
  query Health {
    health {
      status
      timestamp
    }
  }
";

pub const GENERATE_MUTATION: &str = r"
  mutation GenerateResponse($input: ChatInput!) {
    generateResponse(input: $input) {
      content
      model
      finishReason
    }
  }
";
