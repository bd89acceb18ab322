use crate::cli::ConfigAction;
use crate::context::CliContext;

pub async fn handle(ctx: &mut CliContext, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", ctx.config.to_toml()?);
        }
        ConfigAction::Set(flags) => {
            if flags.is_empty() {
                anyhow::bail!("Nothing to set: pass --entity-id or --board-id");
            }
            flags.apply_to(&mut ctx.config.card);
            let path = ctx.save()?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}
