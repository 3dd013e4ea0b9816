//! Unit tests for the guard expression language.

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serde_json::json;

use super::{CompareOp, Condition, Expr, Operand};
use crate::Variables;

#[fixture]
fn launch() -> Variables {
    Variables::new(json!({
        "transport": "http,xmpp",
        "node": {"top-composer": true, "shell-port": 0},
        "transport-http": {"http-ipv": 4}
    }))
}

fn eval(source: &str, vars: &Variables) -> Result<bool> {
    let condition = Condition::parse(source).map_err(|err| anyhow!("{source}: {err}"))?;
    Ok(condition.evaluate(vars))
}

#[rstest]
#[case("'http' in '${run:transport}'", true)]
#[case("'shell' in '${run:transport}'", false)]
#[case("\"xmpp\" in \"${run:transport}\"", true)]
#[case("'${run:missing.key}' == 'None'", true)]
#[case("'${run:missing.key}' == None", true)]
#[case("'${run:transport}' == None", false)]
#[case("'${run:transport}' != None", true)]
#[case("'None' == None", false)]
#[case("'${run:transport-http.http-ipv}' == '4'", true)]
#[case("'${run:transport-http.http-ipv}' == '6'", false)]
#[case("${run:node.top-composer}", true)]
#[case("not ${run:node.top-composer}", false)]
#[case("not not ${run:node.top-composer}", true)]
#[case("${run:node.shell-port}", false)]
#[case("${run:missing.key}", false)]
#[case("not ${run:missing.key}", true)]
#[case("${run:missing.key} == None", true)]
#[case("'${run:transport-http}' != None and '${run:transport-http.http-ipv}' == '4'", true)]
#[case("'${run:transport-http}' == None and '${run:transport-http.http-ipv}' == '6'", false)]
#[case("not 'http' in '${run:transport}'", false)]
#[case("'a' == 'a'", true)]
#[case("'' ", false)]
fn evaluates_corpus_expressions(
    launch: Variables,
    #[case] source: &str,
    #[case] expected: bool,
) -> Result<()> {
    let outcome = eval(source, &launch)?;
    ensure!(outcome == expected, "{source} evaluated to {outcome}");
    Ok(())
}

#[test]
fn membership_ignores_unrelated_transports() -> Result<()> {
    let vars = Variables::new(json!({"transport": "xmpp"}));
    ensure!(!eval("'http' in '${run:transport}'", &vars)?);
    ensure!(eval("'xmpp' in '${run:transport}'", &vars)?);
    Ok(())
}

#[test]
fn membership_works_on_transport_lists() -> Result<()> {
    let vars = Variables::new(json!({"transport": ["http", "xmpp"]}));
    ensure!(eval("'http' in '${run:transport}'", &vars)?);
    Ok(())
}

#[test]
fn not_binds_looser_than_comparison() -> Result<()> {
    let condition = Condition::parse("not 'a' == 'b'").map_err(|err| anyhow!("{err}"))?;
    let expected = Expr::Not(Box::new(Expr::Compare {
        op: CompareOp::Eq,
        left: Operand::Literal("a".into()),
        right: Operand::Literal("b".into()),
    }));
    ensure!(condition.expr() == &expected, "unexpected tree {:?}", condition.expr());
    Ok(())
}

#[rstest]
#[case("", "empty condition")]
#[case("'http' in", "expected an operand")]
#[case("'http", "unterminated string literal")]
#[case("http in '${run:transport}'", "unknown word 'http'")]
#[case("'a' = 'b'", "unexpected character '='")]
#[case("'a' == 'b' 'c'", "unexpected literal 'c'")]
#[case("'a' == 'b' or 'c' == 'd'", "unexpected 'or'")]
#[case("not", "expected an operand")]
#[case("${run:transport", "unterminated placeholder")]
#[case("${env:HOME} == 'x'", "unsupported placeholder")]
#[case("True", "unknown word 'True'")]
#[case("${run:node.shell-port} == 0", "unknown word '0'")]
fn rejects_malformed_expressions(#[case] source: &str, #[case] fragment: &str) -> Result<()> {
    match Condition::parse(source) {
        Ok(condition) => Err(anyhow!("{source} parsed as {:?}", condition.expr())),
        Err(err) => {
            ensure!(
                err.message.contains(fragment),
                "{source}: unexpected error {err}"
            );
            Ok(())
        }
    }
}

#[test]
fn reports_offset_of_offending_token() -> Result<()> {
    let err = match Condition::parse("'a' == 'b' junk") {
        Ok(_) => return Err(anyhow!("trailing input accepted")),
        Err(err) => err,
    };
    ensure!(err.offset == 11, "unexpected offset {}", err.offset);
    Ok(())
}
