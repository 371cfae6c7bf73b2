use super::CommandContext;
use anyhow::{Result, bail};
use tracing::info;
use vrv_access::{AccessError, Decision, LoginOutcome, Resource};

pub async fn login(ctx: &CommandContext, email: &str, password: &str) -> Result<()> {
    match ctx.access.login.login(email, password).await {
        Ok(LoginOutcome::Established(session)) => {
            let landing = ctx.access.gate.default_landing(&session.principal);
            println!("Signed in as {} ({})", session.principal.name, session.principal.role);
            println!("  Email: {}", session.principal.email);
            println!("  Department: {}", session.principal.department);
            println!("  Landing: {}", landing.path());
            Ok(())
        }
        Ok(LoginOutcome::Superseded) => {
            println!("Login was superseded by a newer attempt.");
            Ok(())
        }
        Err(AccessError::Authentication { .. }) => bail!("Invalid email or password"),
        Err(e) => Err(e.into()),
    }
}

pub fn logout(ctx: &CommandContext) -> Result<()> {
    let was_signed_in = ctx.access.sessions.is_authenticated();
    ctx.access.login.logout()?;

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

pub fn whoami(ctx: &CommandContext) -> Result<()> {
    let Some(session) = ctx.access.sessions.current_session() else {
        println!("Not signed in.");
        return Ok(());
    };

    let principal = &session.principal;
    println!("{} <{}>", principal.name, principal.email);
    println!("  Role: {}", principal.role);
    println!("  Department: {}", principal.department);
    println!("  Token: {}", ctx.config.session.token_mode);
    Ok(())
}

pub fn guard(ctx: &CommandContext, path: &str, json: bool) -> Result<()> {
    let navigation = ctx.access.guard.navigate(path);
    info!(path = %path, decision = ?navigation.decision, "Navigation guarded");

    if json {
        println!("{}", serde_json::to_string_pretty(&navigation)?);
        return Ok(());
    }

    let resource = navigation.resource.as_deref().unwrap_or("-");
    match (navigation.decision, navigation.redirect_to.as_deref()) {
        (Decision::Allow, _) => println!("Allow: {} ({})", path, resource),
        (decision, Some(target)) => println!("{:?}: {} ({}) -> {}", decision, path, resource, target),
        (decision, None) => println!("{:?}: {} ({})", decision, path, resource),
    }
    Ok(())
}

pub fn show_navigation(ctx: &CommandContext) -> Result<()> {
    let Some(principal) = ctx.access.sessions.current_principal() else {
        println!("Not signed in.");
        return Ok(());
    };

    let menu = ctx.access.navigation(principal.role);
    println!("Navigation for {}:", principal.role);
    println!("{:<15} {:<15}", "Item", "Path");
    println!("{}", "-".repeat(30));
    for item in &menu.main {
        println!("{:<15} {:<15}", item.label, item.path);
    }
    println!("{}", "-".repeat(30));
    for item in &menu.secondary {
        println!("{:<15} {:<15}", item.label, item.path);
    }
    Ok(())
}

pub fn show_policy(ctx: &CommandContext) -> Result<()> {
    let policy = ctx.access.gate.policy();

    println!("{:<20} {:<15} {}", "Resource", "Path", "Allowed Roles");
    println!("{}", "-".repeat(60));
    for resource in policy.resources() {
        let path = Resource::from_id(resource).map(|known| known.path()).unwrap_or("-");
        let roles = policy
            .allowed_roles(resource)
            .map(|roles| roles.iter().map(|role| role.as_str()).collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        println!("{:<20} {:<15} {}", resource, path, roles);
    }
    Ok(())
}
