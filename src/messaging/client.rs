use crate::config::Settings;
use crate::core::{commands::Command, handlers::CommandHandlers};
use crate::error::{BotError, BotResult};
use http::StatusCode;
use slack_morphism::{
    api::SlackApiChatPostMessageRequest,
    events::{SlackEventCallbackBody, SlackPushEventCallback},
    hyper_tokio::{SlackClientHyperConnector, SlackHyperClient},
    listener::{SlackClientEventsListenerEnvironment, SlackClientEventsUserState},
    SlackApiToken, SlackApiTokenValue, SlackClient, SlackClientSocketModeConfig,
    SlackClientSocketModeListener, SlackMessageContent, SlackSocketModeListenerCallbacks,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

// Shared with the socket mode callbacks through the listener user state.
struct MessagingState {
    handlers: Arc<CommandHandlers>,
    bot_token: SlackApiToken,
}

/// Text to answer with, when the message is a command.
pub fn reply_to(text: &str, handlers: &CommandHandlers) -> BotResult<Option<String>> {
    match Command::parse(text) {
        Some(command) => {
            info!("Received command '{command}'.");
            let reply = handlers.handle(command)?;
            Ok(Some(reply.render()?))
        }
        None => Ok(None),
    }
}

async fn push_events_socket_mode_function(
    event: SlackPushEventCallback,
    client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Only watch Message events for now.
    let message = match event.event {
        SlackEventCallbackBody::Message(message) => message,
        _ => return Ok(()),
    };

    // Abort if message from bot
    if message.sender.bot_id.is_some() {
        return Ok(());
    }

    let (Some(content), Some(channel_id)) = (message.content, message.origin.channel) else {
        return Ok(());
    };
    let Some(text) = content.text else {
        return Ok(());
    };

    // Scoped so the state lock is not held across the post below
    let (handlers, bot_token) = {
        let states = states.read().await;
        match states.get_user_state::<MessagingState>() {
            Some(state) => (state.handlers.clone(), state.bot_token.clone()),
            None => {
                return Err(BotError::Slack("Messaging state not initialized.".to_string()).into())
            }
        }
    };

    if let Some(response_text) = reply_to(&text, &handlers)? {
        let session = client.open_session(&bot_token);
        // Respond in thread
        let response = SlackApiChatPostMessageRequest::new(
            channel_id,
            SlackMessageContent::new().with_text(response_text),
        )
        .with_thread_ts(message.origin.ts);
        session.chat_post_message(&response).await?;
    }

    Ok(())
}

fn error_handler(
    err: Box<dyn std::error::Error + Send + Sync>,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> StatusCode {
    let error = BotError::Slack(err.to_string());
    error!("{error}");

    // This return value should be OK if we want to return successful ack to the Slack server using Web-sockets
    // https://api.slack.com/apis/connections/socket-implement#acknowledge
    // so that Slack knows whether to retry
    StatusCode::OK
}

/// Listens for commands until the cancellation token fires.
pub async fn initialize_messaging(
    handlers: Arc<CommandHandlers>,
    settings: &Settings,
    cancellation: CancellationToken,
) -> BotResult<()> {
    let client = Arc::new(SlackClient::new(SlackClientHyperConnector::new()));

    let bot_token_value: SlackApiTokenValue = settings.slack_token.clone().into();
    let state = MessagingState {
        handlers,
        bot_token: SlackApiToken::new(bot_token_value),
    };

    let socket_mode_callbacks =
        SlackSocketModeListenerCallbacks::new().with_push_events(push_events_socket_mode_function);

    let listener_environment = Arc::new(
        SlackClientEventsListenerEnvironment::new(client.clone())
            .with_error_handler(error_handler)
            .with_user_state(state),
    );

    let socket_mode_listener = SlackClientSocketModeListener::new(
        &SlackClientSocketModeConfig::new(),
        listener_environment.clone(),
        socket_mode_callbacks,
    );

    let app_token_value: SlackApiTokenValue = settings.slack_app_token.clone().into();
    let app_token: SlackApiToken = SlackApiToken::new(app_token_value);

    socket_mode_listener
        .listen_for(&app_token)
        .await
        .map_err(|e| BotError::Slack(e.to_string()))?;

    info!("Listening for commands.");
    socket_mode_listener.start().await;
    cancellation.cancelled().await;

    info!("Shutting down messaging.");
    socket_mode_listener.shutdown().await;

    Ok(())
}
