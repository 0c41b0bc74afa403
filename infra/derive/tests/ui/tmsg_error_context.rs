use std::borrow::Cow;
use tmsg_derive::tmsg_error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tmsg_error]
pub enum HandlerError {
    #[error("Handler failed{}: {source}", format_context(.context))]
    Handler { source: BoxError, context: Option<Cow<'static, str>> },
}

fn failing() -> Result<(), BoxError> {
    Err("exploded".into())
}

fn run() -> Result<(), HandlerError> {
    failing().context("category Tick")?;
    Ok(())
}

fn main() {
    let err = run().unwrap_err();
    assert_eq!(err.to_string(), "Handler failed (category Tick): exploded");

    let err = Err::<(), _>(err).context("second pass").unwrap_err();
    assert_eq!(err.to_string(), "Handler failed (second pass): exploded");
}
