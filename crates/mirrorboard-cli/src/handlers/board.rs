use crate::cli::ReferenceArgs;
use crate::context::{self, CliContext};
use crate::output;
use mirrorboard_domain::BoardResolver;
use serde::Serialize;
use std::path::Path;

pub async fn handle_show(
    ctx: &CliContext,
    states: &Path,
    flags: &ReferenceArgs,
    json: bool,
) -> anyhow::Result<()> {
    let reference = ctx.reference(flags)?;
    let records = context::load_records(states).await?;

    match BoardResolver::new(reference).resolve(&records) {
        Ok(board) if json => output::output_success(&board),
        Ok(board) => print!("{}", output::render_board(&board)),
        Err(missing) if json => output::output_error(&missing.to_string()),
        Err(missing) => println!("{}", output::placeholder(&missing)),
    }
    Ok(())
}

#[derive(Serialize)]
struct EntitySummary {
    entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    board_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

pub async fn handle_entities(states: &Path, json: bool) -> anyhow::Result<()> {
    let records = context::load_records(states).await?;
    let entities: Vec<EntitySummary> = records
        .board_candidates()
        .into_iter()
        .map(|record| {
            let payload = record.attributes.board_data.as_ref();
            EntitySummary {
                entity_id: record.entity_id.clone(),
                board_id: payload
                    .map(|board| board.id.clone())
                    .or_else(|| record.attributes.board_id.clone()),
                name: payload
                    .map(|board| board.name.clone())
                    .or_else(|| record.attributes.board_name.clone()),
            }
        })
        .collect();

    if json {
        output::output_list(entities);
        return Ok(());
    }

    if entities.is_empty() {
        println!("No board entities found");
    }
    for entity in &entities {
        match &entity.name {
            Some(name) => println!("{}\t{}", entity.entity_id, name),
            None => println!("{}", entity.entity_id),
        }
    }
    Ok(())
}
