use super::CommandContext;
use crate::{DepartmentCommands, RoleCommands, UserCommands};
use anyhow::{Result, anyhow};
use vrv_access::Principal;
use vrv_access::directory::{DepartmentFilter, RecordStatus};

pub async fn handle_user_command(ctx: &CommandContext, command: UserCommands) -> Result<()> {
    let actor = ctx.access.sessions.current_principal();
    match command {
        UserCommands::List => list_users(ctx, actor.as_ref()).await,
        UserCommands::Show { id } => show_user(ctx, actor.as_ref(), &id).await,
    }
}

pub async fn handle_role_command(ctx: &CommandContext, command: RoleCommands) -> Result<()> {
    let actor = ctx.access.sessions.current_principal();
    match command {
        RoleCommands::List => list_roles(ctx, actor.as_ref()).await,
    }
}

pub async fn handle_department_command(ctx: &CommandContext, command: DepartmentCommands) -> Result<()> {
    let actor = ctx.access.sessions.current_principal();
    match command {
        DepartmentCommands::List { search, status, location } => {
            let filter = DepartmentFilter {
                search,
                status: status.as_deref().map(parse_status).transpose()?,
                location,
            };
            list_departments(ctx, actor.as_ref(), &filter).await
        }
    }
}

fn parse_status(value: &str) -> Result<RecordStatus> {
    match value.to_ascii_lowercase().as_str() {
        "active" => Ok(RecordStatus::Active),
        "inactive" => Ok(RecordStatus::Inactive),
        _ => Err(anyhow!("Invalid status. Valid options: Active, Inactive")),
    }
}

async fn list_users(ctx: &CommandContext, actor: Option<&Principal>) -> Result<()> {
    let users = ctx.access.directory.list_users(actor).await?;

    println!("{:<8} {:<16} {:<20} {:<10} {:<10} {:<12} {:<18}", "ID", "Name", "Email", "Role", "Status", "Department", "Location");
    println!("{}", "-".repeat(100));
    for user in users {
        println!(
            "{:<8} {:<16} {:<20} {:<10} {:<10} {:<12} {:<18}",
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            user.status.to_string(),
            user.department,
            user.location
        );
    }
    Ok(())
}

async fn show_user(ctx: &CommandContext, actor: Option<&Principal>, id: &str) -> Result<()> {
    let user = ctx.access.directory.get_user(actor, id).await?;

    println!("{} ({})", user.name, user.id);
    println!("  Email: {}", user.email);
    println!("  Role: {}", user.role);
    println!("  Status: {}", user.status);
    println!("  Department: {}", user.department);
    println!("  Phone: {}", user.phone.as_deref().unwrap_or("-"));
    println!("  Location: {}", user.location);
    println!("  Joined: {}", user.join_date.format("%Y-%m-%d"));
    Ok(())
}

async fn list_roles(ctx: &CommandContext, actor: Option<&Principal>) -> Result<()> {
    let roles = ctx.access.directory.list_roles(actor).await?;

    println!("{:<10} {:<12} {:<10} {:<26} {}", "ID", "Name", "Status", "Description", "Permissions");
    println!("{}", "-".repeat(100));
    for role in roles {
        println!("{:<10} {:<12} {:<10} {:<26} {}", role.id, role.name, role.status.to_string(), role.description, role.permissions.join(", "));
    }
    Ok(())
}

async fn list_departments(ctx: &CommandContext, actor: Option<&Principal>, filter: &DepartmentFilter) -> Result<()> {
    let departments = ctx.access.directory.list_departments(actor, filter).await?;

    if departments.is_empty() {
        println!("No departments found matching the filters.");
        return Ok(());
    }

    println!("{:<8} {:<12} {:<16} {:<18} {:<10} {:<10} {:<8}", "ID", "Name", "Head", "Location", "Status", "Employees", "Budget");
    println!("{}", "-".repeat(90));
    for department in departments {
        println!(
            "{:<8} {:<12} {:<16} {:<18} {:<10} {:<10} {:>5.1}%",
            department.id,
            department.name,
            department.head,
            department.location,
            department.status.to_string(),
            department.employee_count,
            department.budget_used_percent()
        );
    }
    Ok(())
}
