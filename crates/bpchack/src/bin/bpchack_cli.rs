//! Interactive terminal driver for the four-step flow. Prompts remember the
//! previous answer (seeded from the environment) so a retry only needs the
//! fields that changed.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use bpc_mpi::{
    ConfirmPaymentRequest, HackStatus, MpiService, ResendCodeRequest, StartHackRequest,
    SubmitCardRequest,
};
use bpchack::logger;
use masking::Secret;

const CLI_DRIVER_TIMEOUT: Duration = Duration::from_secs(30);
const CLI_APPLICATION: &str = "bpchackcli";

fn prompt(reader: &mut impl BufRead, label: &str, default: &str) -> io::Result<String> {
    if default.is_empty() {
        print!("{label} > ");
    } else {
        print!("{label} [{default}] > ");
    }
    io::stdout().flush()?;

    let mut input = String::new();
    reader.read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() {
        default.to_owned()
    } else {
        input.to_owned()
    })
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let dotenv_error = dotenv::dotenv().err();
    logger::setup();
    if let Some(error) = dotenv_error {
        tracing::warn!(%error, "error loading .env, ignoring");
    }

    let mut reader = io::BufReader::new(io::stdin());
    let identity = std::env::var("USER").unwrap_or_else(|_| "operator".to_owned());

    let mut mpi_base_url = std::env::var("MPI_BASE_URL").unwrap_or_default();
    let mut payment_url = String::new();
    let mut card_number = std::env::var("CARD_NUMBER").unwrap_or_default();
    let mut name_on_card = std::env::var("NAME_ON_CARD").unwrap_or_default();
    let mut card_expiry = std::env::var("CARD_EXPIRY").unwrap_or_default();

    loop {
        loop {
            mpi_base_url = prompt(&mut reader, "mpi base url", &mpi_base_url)?;
            if mpi_base_url.starts_with("https://") && mpi_base_url.len() >= 12 {
                break;
            }
            println!("please verify mpi base url");
        }
        let service = MpiService::new(mpi_base_url.clone(), CLI_DRIVER_TIMEOUT);

        payment_url = prompt(&mut reader, "payment url", &payment_url)?;
        let step1 = match service
            .start_hack(StartHackRequest {
                application: CLI_APPLICATION.to_owned(),
                identity: identity.clone(),
                payment_url: payment_url.clone(),
            })
            .await
        {
            Ok(response) => response,
            Err(report) => {
                eprintln!("step 1 failed, restarting: {report:?}");
                continue;
            }
        };
        println!("response: {step1:?}\n");
        if step1.status != HackStatus::Ok {
            continue;
        }
        let md_order = step1.md_order.unwrap_or_default();

        card_number = prompt(&mut reader, "Card Number", &card_number)?;
        name_on_card = prompt(&mut reader, "Name on Card", &name_on_card)?;
        card_expiry = prompt(&mut reader, "Card Expiry", &card_expiry)?;
        let card_cvc = prompt(&mut reader, "Card CVC", "")?;

        let step2 = match service
            .submit_card(SubmitCardRequest {
                application: CLI_APPLICATION.to_owned(),
                identity: identity.clone(),
                md_order: md_order.clone(),
                card_number: Secret::new(card_number.clone()),
                expiry: Secret::new(card_expiry.clone()),
                name_on_card: name_on_card.clone(),
                cvc_code: (!card_cvc.is_empty()).then(|| Secret::new(card_cvc)),
            })
            .await
        {
            Ok(response) => response,
            Err(report) => {
                eprintln!("step 2 failed, restarting: {report:?}");
                continue;
            }
        };
        println!("response: {step2:?}\n");
        if step2.status != HackStatus::Ok {
            continue;
        }

        let acs_request_id = step2.acs_request_id.unwrap_or_default();
        let acs_session_url = step2.acs_session_url.unwrap_or_default();
        let terminate_url = step2.terminate_url.unwrap_or_default();
        println!(
            "one-time password sent to {} ({} resend attempt(s) left)",
            step2.three_d_secure_number.unwrap_or_default(),
            step2.resend_attempts_left.unwrap_or_default(),
        );

        loop {
            let input = prompt(&mut reader, "otp (r to resend, q to quit)", "")?;
            match input.as_str() {
                "q" => return Ok(()),
                "r" => {
                    match service
                        .resend_code(ResendCodeRequest {
                            application: CLI_APPLICATION.to_owned(),
                            identity: identity.clone(),
                            acs_request_id: acs_request_id.clone(),
                            acs_session_url: acs_session_url.clone(),
                        })
                        .await
                    {
                        Ok(response) => println!(
                            "resent, {} attempt(s) left",
                            response.resend_attempts_left
                        ),
                        Err(report) => eprintln!("resend failed: {report:?}"),
                    }
                }
                "" => continue,
                otp => {
                    match service
                        .confirm_payment(ConfirmPaymentRequest {
                            application: CLI_APPLICATION.to_owned(),
                            identity: identity.clone(),
                            md_order: md_order.clone(),
                            acs_request_id: acs_request_id.clone(),
                            acs_session_url: acs_session_url.clone(),
                            one_time_password: Secret::new(otp.to_owned()),
                            terminate_url: terminate_url.clone(),
                        })
                        .await
                    {
                        Ok(response) => match response.status {
                            HackStatus::Ok => {
                                println!(
                                    "payment confirmed, landed at {}",
                                    response.final_url.unwrap_or_default()
                                );
                                return Ok(());
                            }
                            HackStatus::WrongOtp => {
                                println!(
                                    "wrong otp, attempt {} of {}",
                                    response.current_attempt.unwrap_or_default(),
                                    response.total_attempts.unwrap_or_default(),
                                );
                            }
                            HackStatus::OperationCancelled => {
                                println!("operation cancelled, restarting");
                                break;
                            }
                            other => {
                                println!("unexpected outcome: {other:?}");
                                break;
                            }
                        },
                        Err(report) => eprintln!("confirm failed: {report:?}"),
                    }
                }
            }
        }
    }
}
